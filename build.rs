use std::env;

fn main() {
	println!("cargo:rerun-if-changed=build.rs");
	println!("cargo:rerun-if-env-changed=PACKGEMM_FLAGS");

	let cfg_flags = &[
		"kernel_generic4x4",
		"kernel_generic8x4fma",
		"prefetch",
		"debug_packgemm",
	];

	for flag in cfg_flags {
		println!("cargo:rustc-check-cfg=cfg({})", flag);
	}

	if let Ok(flags) = env::var("PACKGEMM_FLAGS") {
		let user_flags = flags.split(',').map(|s| s.trim()).collect::<Vec<_>>();

		for user_flag in user_flags.iter() {
			if cfg_flags.iter().any(|flag| flag == user_flag) {
				println!("cargo:rustc-cfg={}", user_flag);
			} else {
				panic!("Environment variable PACKGEMM_FLAGS contained unrecognised flag: {}", user_flag);
			}
		}
	}
}
