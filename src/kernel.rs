// Original work Copyright 2016 bluss
// Modified work Copyright 2016 J. Millard.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::cmp::min;

use num_traits::Float;
use typenum::Unsigned;
use typenum_loops::Loop;

use crate::params::{KernelConfig, GA};
use crate::{prefetch_read, prefetch_write};

/// Microkernel: rank-k update of one MR x NR tile of C.
///
/// C_tile ← A_panel B_panel + C_tile
///
/// + k: length of data in the packed panels
/// + a: one packed row panel of A~, MR elements per k step
/// + b: one packed column panel of B~, NR elements per k step
/// + c: tile of C with general strides
///
/// The current contents of the tile seed the accumulators; C may hold a
/// partial result from earlier k chunks.
#[inline(never)]
pub unsafe fn kernel<K: KernelConfig>(k: usize,
					a: *const K::T,
					b: *const K::T,
					c: *mut K::T,
					rsc: isize,
					csc: isize) {
	prefetch_read(a as *const i8);
	prefetch_read(b as *const i8);
	write_prefetch::<K>(c, rsc, csc);

	let mut ab = tile_load::<K>(c, rsc, csc);
	tile_update::<K>(k, a, b, &mut ab);
	tile_store::<K>(c, rsc, csc, &ab);
}

/// Microkernel for tiles truncated by the matrix edge.
///
/// Runs the update at full tile width regardless (panel padding keeps the
/// lanes past the edge at zero), but seeds from and writes back only the
/// `rows` x `cols` sub-block that exists in C.
pub unsafe fn masked_kernel<K: KernelConfig>(k: usize,
					a: *const K::T,
					b: *const K::T,
					c: *mut K::T,
					rsc: isize,
					csc: isize,
					rows: usize,
					cols: usize) {
	let rows = min(K::MR::to_usize(), rows);
	let cols = min(K::NR::to_usize(), cols);
	prefetch_read(a as *const i8);
	prefetch_read(b as *const i8);

	let mut ab = <GA<GA<K::T, K::NR>, K::MR>>::default();
	for i in 0..rows {
		for j in 0..cols {
			ab[i][j] = *c.offset(rsc * i as isize + csc * j as isize);
		}
	}

	tile_update::<K>(k, a, b, &mut ab);

	for i in 0..rows {
		for j in 0..cols {
			*c.offset(rsc * i as isize + csc * j as isize) = ab[i][j];
		}
	}
}

/// Accumulate the rank-k product of one A~ panel and one B~ panel into the
/// tile. Split out so both kernel entries vectorise the same way.
#[inline(always)]
unsafe fn tile_update<K: KernelConfig>(k: usize,
					a: *const K::T,
					b: *const K::T,
					ab: &mut GA<GA<K::T, K::NR>, K::MR>) {
	K::KU::partial_unroll(k, &mut |p, _| {
		let a = a.offset((p * K::MR::to_usize()) as isize);
		let b = b.offset((p * K::NR::to_usize()) as isize);

		K::MR::full_unroll(&mut |i| {
			K::NR::full_unroll(&mut |j| {
				if K::FMA::to_usize() > 0 {
					ab[i][j] = at::<K::T>(a, i).mul_add(at::<K::T>(b, j), ab[i][j]);
				} else {
					ab[i][j] = ab[i][j] + at::<K::T>(a, i) * at::<K::T>(b, j);
				}
			});
		});
	});
}

/// Load the current C tile, choosing reads in a cache friendly order.
#[inline(always)]
unsafe fn tile_load<K: KernelConfig>(c: *const K::T, rsc: isize, csc: isize) -> GA<GA<K::T, K::NR>, K::MR> {
	let mut ab = <GA<GA<K::T, K::NR>, K::MR>>::default();

	if rsc == 1 {
		for j in 0..K::NR::to_usize() {
			for i in 0..K::MR::to_usize() {
				ab[i][j] = *c.offset(1 * i as isize + csc * j as isize);
			}
		}
	} else if csc == 1 {
		for i in 0..K::MR::to_usize() {
			for j in 0..K::NR::to_usize() {
				ab[i][j] = *c.offset(rsc * i as isize + 1 * j as isize);
			}
		}
	} else {
		for i in 0..K::MR::to_usize() {
			for j in 0..K::NR::to_usize() {
				ab[i][j] = *c.offset(rsc * i as isize + csc * j as isize);
			}
		}
	}

	ab
}

/// Store the finished tile back, choosing writes in a cache friendly order.
#[inline(always)]
unsafe fn tile_store<K: KernelConfig>(c: *mut K::T, rsc: isize, csc: isize, ab: &GA<GA<K::T, K::NR>, K::MR>) {
	if rsc == 1 {
		for j in 0..K::NR::to_usize() {
			for i in 0..K::MR::to_usize() {
				*c.offset(1 * i as isize + csc * j as isize) = ab[i][j];
			}
		}
	} else if csc == 1 {
		for i in 0..K::MR::to_usize() {
			for j in 0..K::NR::to_usize() {
				*c.offset(rsc * i as isize + 1 * j as isize) = ab[i][j];
			}
		}
	} else {
		for i in 0..K::MR::to_usize() {
			for j in 0..K::NR::to_usize() {
				*c.offset(rsc * i as isize + csc * j as isize) = ab[i][j];
			}
		}
	}
}

/// Prefetch the locations of C which will be written to.
#[inline(always)]
unsafe fn write_prefetch<K: KernelConfig>(c: *mut K::T, rsc: isize, csc: isize) {
	if rsc == 1 {
		K::NR::full_unroll(&mut |j| {
			prefetch_write(c.offset(csc * j as isize) as *const i8);
		});
	} else if csc == 1 {
		K::MR::full_unroll(&mut |i| {
			prefetch_write(c.offset(rsc * i as isize) as *const i8);
		});
	} else {
		for i in 0..K::MR::to_usize() {
			for j in 0..K::NR::to_usize() {
				prefetch_write(c.offset(rsc * i as isize + csc * j as isize) as *const i8);
			}
		}
	}
}

#[inline(always)]
unsafe fn at<T: Copy>(ptr: *const T, i: usize) -> T {
	*ptr.offset(i as isize)
}
