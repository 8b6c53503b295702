// Original work Copyright 2016 bluss
// Modified work Copyright 2016 J. Millard.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//!
//! Cache blocked general matrix multiplication for f64 matrices:
//! C ← A B + C.
//!
//! Allows arbitrary row, column strided matrices.
//!
//! Uses the same microkernel algorithm as [BLIS][bl], in a much simpler
//! and less featureful implementation: a five level loop nest partitions
//! the operands into blocks sized for successive cache tiers, each block of
//! A and B is repacked once into a contiguous, zero padded, 64-byte aligned
//! buffer, and a small fixed-shape register tile kernel performs the
//! arithmetic with fused multiply-add. See the BLIS [multithreading][mt]
//! page for a very good diagram of how the algorithm partitions the matrix
//! (this crate is the single threaded shape of that diagram).
//!
//! [bl]: https://github.com/flame/blis
//!
//! [mt]: https://github.com/flame/blis/wiki/Multithreading
//!
//! ## Matrix Representation
//!
//! **packgemm** supports matrices with general stride. A matrix is passed
//! as a [`MatRef`]/[`MatMut`] view, built from a pointer and four integers:
//!
//! - `a: *const f64`, pointer to the first element in the matrix
//! - `m: usize`, number of rows
//! - `k: usize`, number of columns
//! - `rsa: isize`, row stride
//! - `csa: isize`, column stride
//!
//! In this example, A is a m by k matrix. `a` is a pointer to the element
//! at index *0, 0*.
//!
//! The *row stride* is the pointer offset (in number of elements) to the
//! element on the next row. It’s the distance from element *i, j* to *i +
//! 1, j*.
//!
//! The *column stride* is the pointer offset (in number of elements) to
//! the element in the next column. It’s the distance from element *i, j*
//! to *i, j + 1*.
//!
//! For example for a contiguous matrix, row major strides are *rsa=k,
//! csa=1* and column major strides are *rsa=1, csa=m*.
//!
//! Strides can be negative or even zero, but for a mutable matrix elements
//! may not alias each other.
//!
//! ## Kernel selection
//!
//! The default register tile is 4x4 with fused multiply-add. The
//! `PACKGEMM_FLAGS` environment variable selects an alternative at build
//! time (`kernel_generic4x4` for targets without FMA, `kernel_generic8x4fma`
//! for wider vector units), and [`gemm_loop`] accepts any
//! [`KernelConfig`]/[`BlockConfig`] pair for custom tiles and blocking
//! geometries.

#[macro_use]
mod debugmacros;

mod aligned;
mod gemm;
mod kernel;
mod params;
mod util;
mod view;

pub use crate::gemm::dgemm;
pub use crate::gemm::gemm_loop;
pub use crate::params::{
	BlockConfig, BlockConfigValues, DgemmCache, Element, KernelConfig, D4x4, D4x4fma, D8x4fma,
};
pub use crate::view::{MatMut, MatRef};

/// If the 'prefetch' build flag is not enabled this does nothing.
/// Prefetch the cache line at `p` for reading.
pub(crate) unsafe fn prefetch_read(p: *const i8) {
	if cfg!(all(prefetch, target_feature = "sse2")) {
		#[cfg(target_arch = "x86_64")]
		std::arch::x86_64::_mm_prefetch::<{ std::arch::x86_64::_MM_HINT_T0 }>(p);

		#[cfg(target_arch = "x86")]
		std::arch::x86::_mm_prefetch::<{ std::arch::x86::_MM_HINT_T0 }>(p);
	}
}

/// If the 'prefetch' build flag is not enabled this does nothing.
/// Prefetch the cache line at `p` with intent to write.
pub(crate) unsafe fn prefetch_write(p: *const i8) {
	if cfg!(all(prefetch, target_feature = "sse2")) {
		#[cfg(target_arch = "x86_64")]
		std::arch::x86_64::_mm_prefetch::<{ std::arch::x86_64::_MM_HINT_ET0 }>(p);

		#[cfg(target_arch = "x86")]
		std::arch::x86::_mm_prefetch::<{ std::arch::x86::_MM_HINT_ET0 }>(p);
	}
}
