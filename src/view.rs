// Original work Copyright 2016 bluss
// Modified work Copyright 2016 J. Millard.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use rawpointer::PointerExt;

/// Read-only view of a dense strided matrix.
///
/// Element (i, j) lives at `ptr + i * rs + j * cs`, with both strides in
/// element units. Strides are arbitrary, so row major, column major and
/// windows into larger allocations are all representable.
pub struct MatRef<T> {
	ptr: *const T,
	rows: usize,
	cols: usize,
	rs: isize,
	cs: isize,
}

impl<T> Copy for MatRef<T> {}
impl<T> Clone for MatRef<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> MatRef<T> {
	/// Build a view over caller owned memory.
	///
	/// The caller guarantees that every element reachable through
	/// (rows, cols, rs, cs) stays inside the allocation for the lifetime of
	/// the view. Bounds are never validated.
	pub unsafe fn from_raw_parts(ptr: *const T, rows: usize, cols: usize, rs: isize, cs: isize) -> MatRef<T> {
		MatRef { ptr, rows, cols, rs, cs }
	}

	pub fn rows(&self) -> usize {
		self.rows
	}

	pub fn cols(&self) -> usize {
		self.cols
	}

	pub fn row_stride(&self) -> isize {
		self.rs
	}

	pub fn col_stride(&self) -> isize {
		self.cs
	}

	pub fn as_ptr(&self) -> *const T {
		self.ptr
	}

	/// Pointer to element (i, j).
	pub unsafe fn at(&self, i: usize, j: usize) -> *const T {
		self.ptr.stride_offset(self.rs, i).stride_offset(self.cs, j)
	}

	/// Sub-view of extent `rows` x `cols` starting at (i, j).
	pub unsafe fn block(&self, i: usize, j: usize, rows: usize, cols: usize) -> MatRef<T> {
		debug_assert!(i + rows <= self.rows);
		debug_assert!(j + cols <= self.cols);
		MatRef { ptr: self.at(i, j), rows, cols, rs: self.rs, cs: self.cs }
	}
}

/// Mutable view of a dense strided matrix.
///
/// Same addressing as [`MatRef`]. The strides must not make distinct index
/// pairs alias the same element, for example they can not be zero.
pub struct MatMut<T> {
	ptr: *mut T,
	rows: usize,
	cols: usize,
	rs: isize,
	cs: isize,
}

impl<T> Copy for MatMut<T> {}
impl<T> Clone for MatMut<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> MatMut<T> {
	/// Build a mutable view over caller owned memory; same contract as
	/// [`MatRef::from_raw_parts`].
	pub unsafe fn from_raw_parts(ptr: *mut T, rows: usize, cols: usize, rs: isize, cs: isize) -> MatMut<T> {
		MatMut { ptr, rows, cols, rs, cs }
	}

	pub fn rows(&self) -> usize {
		self.rows
	}

	pub fn cols(&self) -> usize {
		self.cols
	}

	pub fn row_stride(&self) -> isize {
		self.rs
	}

	pub fn col_stride(&self) -> isize {
		self.cs
	}

	pub fn as_mut_ptr(&self) -> *mut T {
		self.ptr
	}

	/// Pointer to element (i, j).
	pub unsafe fn at(&self, i: usize, j: usize) -> *mut T {
		self.ptr.stride_offset(self.rs, i).stride_offset(self.cs, j)
	}

	/// Sub-view of extent `rows` x `cols` starting at (i, j).
	pub unsafe fn block(&self, i: usize, j: usize, rows: usize, cols: usize) -> MatMut<T> {
		debug_assert!(i + rows <= self.rows);
		debug_assert!(j + cols <= self.cols);
		MatMut { ptr: self.at(i, j), rows, cols, rs: self.rs, cs: self.cs }
	}
}

#[test]
fn test_addressing() {
	let v: Vec<f64> = (0..12).map(|x| x as f64).collect();

	// 3x4, row major
	let m = unsafe { MatRef::from_raw_parts(v.as_ptr(), 3, 4, 4, 1) };
	unsafe {
		assert_eq!(*m.at(0, 0), 0.0);
		assert_eq!(*m.at(1, 2), 6.0);
		assert_eq!(*m.at(2, 3), 11.0);

		let b = m.block(1, 1, 2, 2);
		assert_eq!(*b.at(0, 0), 5.0);
		assert_eq!(*b.at(1, 1), 10.0);
	}

	// 4x3, column major over the same storage
	let m = unsafe { MatRef::from_raw_parts(v.as_ptr(), 4, 3, 1, 4) };
	unsafe {
		assert_eq!(*m.at(3, 0), 3.0);
		assert_eq!(*m.at(0, 2), 8.0);
	}
}
