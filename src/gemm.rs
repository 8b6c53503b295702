// Original work Copyright 2016 bluss
// Modified work Copyright 2016 J. Millard.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::cmp::min;
use std::mem::size_of;

use generic_array::ArrayLength;
use num_traits::identities::Zero;
use rawpointer::PointerExt;
use typenum::Unsigned;
use typenum_loops::Loop;

use crate::aligned::AlignedBuffer;
use crate::kernel;
use crate::params::{BlockConfig, DgemmCache, Element, KernelConfig, D4x4, D4x4fma, D8x4fma, GA};
use crate::prefetch_read;
use crate::util::{range_chunk, round_up_to};
use crate::view::{MatMut, MatRef};

/// General matrix multiplication (f64)
///
/// C ← A B + C
///
/// + m, n, k: dimensions
/// + a: m by k matrix
/// + b: k by n matrix
/// + c: m by n matrix, updated in place
///
/// Strides for A and B may be arbitrary. Strides for C must not result in
/// elements that alias each other, for example they can not be zero.
///
/// The prior contents of C are the accumulation seed; dimensions of zero
/// degenerate to zero iterations and leave C untouched. Dimension or
/// stride mismatches between the views and (m, n, k) are undefined
/// behaviour, checked in debug builds only.
pub unsafe fn dgemm(m: usize, n: usize, k: usize, a: MatRef<f64>, b: MatRef<f64>, c: MatMut<f64>) {
	debug_assert_eq!((a.rows(), a.cols()), (m, k));
	debug_assert_eq!((b.rows(), b.cols()), (k, n));
	debug_assert_eq!((c.rows(), c.cols()), (m, n));

	if cfg!(kernel_generic4x4) {
		gemm_loop::<DgemmCache, D4x4>(m, n, k, a, b, c);
	} else if cfg!(kernel_generic8x4fma) {
		gemm_loop::<DgemmCache, D8x4fma>(m, n, k, a, b, c);
	} else {
		gemm_loop::<DgemmCache, D4x4fma>(m, n, k, a, b, c);
	}
}

/// Implement matrix multiply using packed buffers and a microkernel
/// strategy. The type parameter `K` is the microkernel configuration, `C`
/// is the cache blocking configuration.
///
/// LOOP 5: split n into nc wide column blocks of B and C.
pub unsafe fn gemm_loop<C: BlockConfig<K>, K: KernelConfig>(m: usize, n: usize, k: usize,
					a: MatRef<K::T>, b: MatRef<K::T>, c: MatMut<K::T>) {
	if m == 0 || n == 0 || k == 0 {
		return;
	}

	// must be able to achieve alignment using only elementwise offsets
	assert!(C::alignment() % size_of::<K::T>() == 0);
	assert_eq!(0, C::nc() % K::NR::to_usize());
	assert_eq!(0, C::mc() % K::MR::to_usize());

	for (j, nc) in range_chunk(n, C::nc()) {
		dprint!("LOOP 5, j={}, nc={}", j, nc);
		let b = b.block(0, j, k, nc);
		let c = c.block(0, j, m, nc);

		gemm_loop_k::<C, K>(m, nc, k, a, b, c);
	}
}

/// LOOP 4: split k into kc deep blocks; pack each block of B into B~.
///
/// Owns B~ for the duration of one sweep over k. Each block of B is packed
/// exactly once per chunk and then reused by every m block below, which
/// amortises the packing cost.
unsafe fn gemm_loop_k<C: BlockConfig<K>, K: KernelConfig>(m: usize, n: usize, k: usize,
					a: MatRef<K::T>, b: MatRef<K::T>, c: MatMut<K::T>) {
	let knr = K::NR::to_usize();
	let mut bpp = AlignedBuffer::<K::T>::new(min(k, C::kc()) * round_up_to(n, knr), C::alignment());
	debug_assert_eq!(bpp.ptr() as usize % C::alignment(), 0);

	for (p, kc) in range_chunk(k, C::kc()) {
		dprint!("LOOP 4, p={}, kc={}", p, kc);
		let b = b.block(p, 0, kc, n);
		let a = a.block(0, p, m, kc);

		// Pack B -> B~: column panels of width NR, the last one zero
		// padded to full width. Stride roles are swapped so columns of B
		// take the role the rows of A play when packing A~.
		pack::<K::T, K::NR>(kc, n, bpp.ptr_mut(), b.as_ptr(), b.col_stride(), b.row_stride());

		gemm_loop_m::<C, K>(m, n, kc, a, bpp.ptr(), c);
	}
}

/// LOOP 3: split m into mc tall blocks; pack each block of A into A~.
///
/// Owns A~ for the duration of one sweep over m.
unsafe fn gemm_loop_m<C: BlockConfig<K>, K: KernelConfig>(m: usize, n: usize, kc: usize,
					a: MatRef<K::T>, bpp: *const K::T, c: MatMut<K::T>) {
	let kmr = K::MR::to_usize();
	let mut app = AlignedBuffer::<K::T>::new(round_up_to(min(m, C::mc()), kmr) * kc, C::alignment());
	debug_assert_eq!(app.ptr() as usize % C::alignment(), 0);

	for (i, mc) in range_chunk(m, C::mc()) {
		dprint!("LOOP 3, i={}, mc={}", i, mc);
		let a = a.block(i, 0, mc, kc);
		let c = c.block(i, 0, mc, n);

		// Pack A -> A~: row panels of width MR
		pack::<K::T, K::MR>(kc, mc, app.ptr_mut(), a.as_ptr(), a.row_stride(), a.col_stride());

		gemm_packed::<K>(mc, n, kc, app.ptr(), bpp, c);
	}
}

/// LOOPS 2 and 1 around the microkernel.
///
/// + app: packed A~, mc rows in panels of MR
/// + bpp: packed B~, nc columns in panels of NR
/// + kc: shared dimension of both packed blocks
unsafe fn gemm_packed<K: KernelConfig>(mc: usize, nc: usize, kc: usize,
					app: *const K::T, bpp: *const K::T, c: MatMut<K::T>) {
	let mr = K::MR::to_usize();
	let nr = K::NR::to_usize();

	// LOOP 2: through column panels of B~
	for (j, nr_) in range_chunk(nc, nr) {
		let bpp = bpp.stride_offset(1, kc * j);
		let c = c.block(0, j, mc, nr_);

		// LOOP 1: through row panels of A~ while the B~ panel is constant
		for (i, mr_) in range_chunk(mc, mr) {
			let app = app.stride_offset(1, kc * i);
			let c = c.block(i, 0, mr_, nr_);

			// GEMM KERNEL: tiles truncated by the matrix edge take the
			// masked path
			if nr_ < nr || mr_ < mr {
				kernel::masked_kernel::<K>(kc, app, bpp, c.as_mut_ptr(), c.row_stride(), c.col_stride(), mr_, nr_);
			} else {
				kernel::kernel::<K>(kc, app, bpp, c.as_mut_ptr(), c.row_stride(), c.col_stride());
			}
		}
	}
}

/// Pack a block into contiguous panels of width `MR`, tile-major: all MR
/// elements of one k step contiguous, the shared dimension next, the panel
/// index outermost.
///
/// The same routine packs both operands. For A~ panels run over rows
/// (`MR = K::MR`); for B~ the caller swaps the stride arguments so that
/// columns take the role of rows (`MR = K::NR`).
///
/// + kc: length of each micro panel
/// + mc: rows of the source block
/// + rsa: stride between elements within a panel
/// + csa: stride along the panel length
unsafe fn pack<T: Element, MR: Unsigned + Loop + ArrayLength<T>>(kc: usize, mc: usize,
					pack: *mut T, a: *const T, rsa: isize, csa: isize) {
	if csa == 1 {
		pack_panels_row_major::<T, MR>(kc, mc, pack, a, rsa);
	} else if rsa == 1 {
		pack_panels_col_major::<T, MR>(kc, mc, pack, a, csa);
	} else {
		pack_panels_strided::<T, MR>(kc, mc, pack, a, rsa, csa);
	}

	let rest = mc % MR::to_usize();
	if rest > 0 {
		pack_panel_tail::<T, MR>(kc, mc, pack, a, rsa, csa, rest);
	}
}

/// Pack whole micro panels from a source whose panel length is contiguous
/// (csa == 1).
unsafe fn pack_panels_row_major<T: Element, MR: Unsigned + Loop + ArrayLength<T>>(kc: usize, mc: usize,
					pack: *mut T, a: *const T, rsa: isize) {
	let mr = MR::to_usize();

	for ir in 0..mc / mr {
		let a = a.stride_offset(rsa, ir * mr);
		let pack = pack.offset((ir * mr * kc) as isize);

		// touch the rows of the panel ahead of the current one
		MR::full_unroll(&mut |i| {
			prefetch_read(a.stride_offset(rsa, mr + i) as *const i8);
		});

		for j in 0..kc {
			let a = a.offset(j as isize);
			MR::full_unroll(&mut |i| {
				*pack.offset((j * mr + i) as isize) = *a.stride_offset(rsa, i);
			});
		}
	}
}

/// Pack whole micro panels from a source whose panels are contiguous
/// (rsa == 1).
unsafe fn pack_panels_col_major<T: Element, MR: Unsigned + Loop + ArrayLength<T>>(kc: usize, mc: usize,
					pack: *mut T, a: *const T, csa: isize) {
	let mr = MR::to_usize();

	for ir in 0..mc / mr {
		let a = a.offset((ir * mr) as isize);
		let pack = pack.offset((ir * mr * kc) as isize);
		prefetch_read(a.offset(mr as isize) as *const i8);

		for j in 0..kc {
			let mut column = <GA<T, MR>>::default();
			let a = a.stride_offset(csa, j);
			MR::full_unroll(&mut |i| {
				column[i] = *a.offset(i as isize);
			});

			MR::full_unroll(&mut |i| {
				*pack.offset((j * mr + i) as isize) = column[i];
			});
		}
	}
}

/// Pack whole micro panels; can handle any rsa or csa.
#[cold]
unsafe fn pack_panels_strided<T: Element, MR: Unsigned + Loop + ArrayLength<T>>(kc: usize, mc: usize,
					pack: *mut T, a: *const T, rsa: isize, csa: isize) {
	let mr = MR::to_usize();

	for ir in 0..mc / mr {
		let a = a.stride_offset(rsa, ir * mr);
		let pack = pack.offset((ir * mr * kc) as isize);

		for j in 0..kc {
			MR::full_unroll(&mut |i| {
				*pack.offset((j * mr + i) as isize) = *a.stride_offset(rsa, i).stride_offset(csa, j);
			});
		}
	}
}

/// Pack the last, partial micro panel, padding the missing positions with
/// exact zeros to a full MR so the kernel can run at full tile width.
#[cold]
unsafe fn pack_panel_tail<T: Element, MR: Unsigned + Loop + ArrayLength<T>>(kc: usize, mc: usize,
					pack: *mut T, a: *const T, rsa: isize, csa: isize, rest: usize) {
	let row_offset = mc - rest;
	let mut pack = pack.offset((row_offset * kc) as isize);

	for j in 0..kc {
		MR::full_unroll(&mut |i| {
			if i < rest {
				*pack = *a.stride_offset(rsa, row_offset + i).stride_offset(csa, j);
			} else {
				*pack = T::zero();
			}
			pack.inc();
		});
	}
}
