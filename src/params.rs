// Original work Copyright 2016 bluss
// Modified work Copyright 2016 J. Millard.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::cmp;

use generic_array::{ArrayLength, GenericArray};
use num_traits::float::Float;
use typenum::*;
use typenum_loops::Loop;

pub type GA<T, U> = GenericArray<T, U>;

/// Element scalar type of the multiply.
pub trait Element: Copy + Default + Float {}
impl<T: Copy + Default + Float> Element for T {}

/// Shape of the register resident microkernel tile.
pub trait KernelConfig: 'static {
	/// Matrix element type.
	type T: Element;
	/// Rows of the register tile.
	type MR: Unsigned + Loop + ArrayLength<Self::T> + ArrayLength<GA<Self::T, Self::NR>>;
	/// Columns of the register tile.
	type NR: Unsigned + Loop + ArrayLength<Self::T>;
	/// Unrolling factor of the kernel loop over the shared dimension.
	type KU: Unsigned + Loop;
	/// If FMA > 0 each term is accumulated with fused multiply-add; with a
	/// plain multiply then add, results can differ from the fused path in
	/// the last bit.
	type FMA: Unsigned;
}

/// The blocking constants: how much of each operand is carved off for each
/// cache tier at each loop level.
pub trait BlockConfigValues: 'static {
	/// Required packing buffer alignment in bytes. Usually cache line size.
	type A: Unsigned;

	/// Rows of A packed at a time. (3rd loop)
	///
	/// Size of A~ is KC x MC.
	type MC: Unsigned;

	/// Columns in C, B that we handle at a time. (5th loop)
	type NC: Unsigned;

	/// Rows of B packed at a time, columns of A at a time. (4th loop)
	///
	/// Size of B~ is NC x KC.
	type KC: Unsigned;
}

/// Blocking constants rounded to whole kernel tiles, so the consistency
/// invariant (MC, NC divisible by the register tile) holds by construction.
pub trait BlockConfig<K: KernelConfig>: BlockConfigValues {
	fn alignment() -> usize {
		Self::A::to_usize()
	}
	fn mc() -> usize {
		cmp::max(1, Self::MC::to_usize() / K::MR::to_usize()) * K::MR::to_usize()
	}
	fn nc() -> usize {
		cmp::max(1, Self::NC::to_usize() / K::NR::to_usize()) * K::NR::to_usize()
	}
	fn kc() -> usize {
		Self::KC::to_usize()
	}
}

impl<T: BlockConfigValues, K: KernelConfig> BlockConfig<K> for T {}

/// Default blocking geometry for f64.
pub struct DgemmCache;
impl BlockConfigValues for DgemmCache {
	type A = U64;
	type MC = U64;
	type NC = U512;
	type KC = U256;
}

/// 4x4 f64 tile, separate multiply and add.
pub struct D4x4;
impl KernelConfig for D4x4 {
	type T = f64;
	type MR = U4;
	type NR = U4;
	type KU = U4;
	type FMA = U0;
}

/// 4x4 f64 tile, fused multiply-add.
pub struct D4x4fma;
impl KernelConfig for D4x4fma {
	type T = f64;
	type MR = U4;
	type NR = U4;
	type KU = U4;
	type FMA = U1;
}

/// 8x4 f64 tile for wider vector units, fused multiply-add.
pub struct D8x4fma;
impl KernelConfig for D8x4fma {
	type T = f64;
	type MR = U8;
	type NR = U4;
	type KU = U4;
	type FMA = U1;
}
