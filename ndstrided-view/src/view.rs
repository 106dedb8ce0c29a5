//! Dynamic-rank strided views and the owned array type.
//!
//! - [`ArrayView`]: immutable view over a borrowed `[T]`
//! - [`ArrayViewMut`]: mutable view over a borrowed `[T]`
//! - [`NdArray`]: owned buffer plus layout

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use ndstrided_traits::{DType, Element};

use crate::broadcast::broadcast_strides;
use crate::order::Order;
use crate::shape::{min_max_view_buffer_index, numel, shape2strides};
use crate::{Result, StridedError};

// ============================================================================
// Validation helpers
// ============================================================================

/// Validate that every addressed buffer index stays within `[0, len)`.
pub(crate) fn validate_bounds(
    len: usize,
    shape: &[usize],
    strides: &[isize],
    offset: usize,
) -> Result<()> {
    let (min, max) = min_max_view_buffer_index(shape, strides, offset)?;
    // Empty views address nothing.
    if shape.iter().any(|&n| n == 0) {
        return Ok(());
    }
    if min < 0 {
        return Err(StridedError::OutOfBounds { index: min, len });
    }
    if max as usize >= len {
        return Err(StridedError::OutOfBounds { index: max, len });
    }
    Ok(())
}

/// Offset (relative to the view origin) of the element at `indices`.
pub(crate) fn checked_element_offset(
    shape: &[usize],
    strides: &[isize],
    indices: &[usize],
) -> Result<isize> {
    if indices.len() != shape.len() {
        return Err(StridedError::RankMismatch(indices.len(), shape.len()));
    }
    let mut idx = 0isize;
    for ((&i, &n), &s) in indices.iter().zip(shape.iter()).zip(strides.iter()) {
        if i >= n {
            return Err(StridedError::IndexOutOfRange {
                index: i as isize,
                max: n as isize - 1,
            });
        }
        idx += i as isize * s;
    }
    Ok(idx)
}

pub(crate) fn check_permutation(perm: &[usize], rank: usize) -> Result<()> {
    if perm.len() != rank {
        return Err(StridedError::RankMismatch(perm.len(), rank));
    }
    let mut seen = vec![false; rank];
    for &p in perm {
        if p >= rank || seen[p] {
            return Err(StridedError::InvalidAxis { axis: p, rank });
        }
        seen[p] = true;
    }
    Ok(())
}

/// Layout after reversing `axis`: the new origin and the negated stride.
pub(crate) fn flipped_layout(
    shape: &[usize],
    strides: &[isize],
    offset: usize,
    axis: usize,
) -> Result<(usize, Vec<isize>)> {
    let rank = shape.len();
    if axis >= rank {
        return Err(StridedError::InvalidAxis { axis, rank });
    }
    let mut new_strides = strides.to_vec();
    let n = shape[axis];
    if n == 0 {
        return Ok((offset, new_strides));
    }
    let shift = strides[axis] * (n as isize - 1);
    new_strides[axis] = -strides[axis];
    Ok(((offset as isize + shift) as usize, new_strides))
}

// ============================================================================
// ArrayView
// ============================================================================

/// Dynamic-rank immutable strided view.
///
/// Element `idx` lives at buffer index `offset + sum(idx[d] * strides[d])`.
pub struct ArrayView<'a, T> {
    ptr: *const T,
    data: &'a [T],
    shape: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: usize,
    order: Order,
}

unsafe impl<T: Send> Send for ArrayView<'_, T> {}
unsafe impl<T: Sync> Sync for ArrayView<'_, T> {}

impl<T> Clone for ArrayView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            ptr: self.ptr,
            data: self.data,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
            order: self.order,
        }
    }
}

impl<T> std::fmt::Debug for ArrayView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayView")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .field("order", &self.order)
            .finish()
    }
}

impl<'a, T> ArrayView<'a, T> {
    /// Create a view over `data`, checking that every element is in bounds.
    pub fn new(
        data: &'a [T],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        order: Order,
    ) -> Result<Self> {
        validate_bounds(data.len(), shape, strides, offset)?;
        // SAFETY: never dereferenced unless the view is non-empty, in which case
        // `offset` was checked to be in bounds.
        let ptr = data.as_ptr().wrapping_add(offset);
        Ok(Self {
            ptr,
            data,
            shape: Arc::from(shape),
            strides: Arc::from(strides),
            offset,
            order,
        })
    }

    /// A contiguous view of `data` with origin at buffer index 0.
    pub fn from_shape(data: &'a [T], shape: &[usize], order: Order) -> Result<Self> {
        let strides = shape2strides(shape, order);
        Self::new(data, shape, &strides, 0, order)
    }

    /// Create a view without bounds checking.
    ///
    /// # Safety
    /// The caller must ensure all index combinations stay within bounds.
    pub unsafe fn new_unchecked(
        data: &'a [T],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        order: Order,
    ) -> Self {
        Self {
            ptr: data.as_ptr().wrapping_add(offset),
            data,
            shape: Arc::from(shape),
            strides: Arc::from(strides),
            offset,
            order,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Raw const pointer to the element at the view's origin.
    #[inline]
    pub fn ptr(&self) -> *const T {
        self.ptr
    }

    /// Permute dimensions.
    pub fn permute(&self, perm: &[usize]) -> Result<ArrayView<'a, T>> {
        check_permutation(perm, self.ndim())?;
        let shape: Vec<usize> = perm.iter().map(|&p| self.shape[p]).collect();
        let strides: Vec<isize> = perm.iter().map(|&p| self.strides[p]).collect();
        Ok(ArrayView {
            ptr: self.ptr,
            data: self.data,
            shape: Arc::from(shape),
            strides: Arc::from(strides),
            offset: self.offset,
            order: self.order,
        })
    }

    /// Reverse the direction of `axis` (zero-copy).
    pub fn flip(&self, axis: usize) -> Result<ArrayView<'a, T>> {
        let (offset, strides) = flipped_layout(&self.shape, &self.strides, self.offset, axis)?;
        Ok(ArrayView {
            ptr: self.data.as_ptr().wrapping_add(offset),
            data: self.data,
            shape: self.shape.clone(),
            strides: Arc::from(strides),
            offset,
            order: self.order,
        })
    }

    /// Broadcast this view to `target_shape`.
    ///
    /// Dimensions are right-aligned; size-1 and missing leading dimensions are
    /// expanded with stride 0.
    pub fn broadcast_to(&self, target_shape: &[usize]) -> Result<ArrayView<'a, T>> {
        let strides = broadcast_strides(target_shape, &self.shape, &self.strides)?;
        Ok(ArrayView {
            ptr: self.ptr,
            data: self.data,
            shape: Arc::from(target_shape),
            strides: Arc::from(strides),
            offset: self.offset,
            order: self.order,
        })
    }
}

impl<T: Element> ArrayView<'_, T> {
    /// Runtime data type of the elements.
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }
}

impl<T: Copy> ArrayView<'_, T> {
    /// Read the element at `indices`.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        let idx = checked_element_offset(&self.shape, &self.strides, indices)?;
        Ok(unsafe { *self.ptr.offset(idx) })
    }

    /// Read an element without bounds checking.
    ///
    /// # Safety
    /// Caller must ensure indices are within bounds.
    #[inline]
    pub unsafe fn get_unchecked(&self, indices: &[usize]) -> T {
        let mut idx = 0isize;
        for (i, &index) in indices.iter().enumerate() {
            idx += index as isize * self.strides[i];
        }
        *self.ptr.offset(idx)
    }

    /// Copy the elements into a vector, visiting indices in the view's order.
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        crate::multi_index::for_each_multi_index(&self.shape, self.order, |idx| {
            out.push(unsafe { self.get_unchecked(idx) });
        });
        out
    }
}

// ============================================================================
// ArrayViewMut
// ============================================================================

/// Dynamic-rank mutable strided view.
pub struct ArrayViewMut<'a, T> {
    ptr: *mut T,
    data: &'a mut [T],
    shape: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: usize,
    order: Order,
}

unsafe impl<T: Send> Send for ArrayViewMut<'_, T> {}

impl<T> std::fmt::Debug for ArrayViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayViewMut")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .field("order", &self.order)
            .finish()
    }
}

impl<'a, T> ArrayViewMut<'a, T> {
    /// Create a mutable view over `data`, checking that every element is in bounds.
    pub fn new(
        data: &'a mut [T],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        order: Order,
    ) -> Result<Self> {
        validate_bounds(data.len(), shape, strides, offset)?;
        let ptr = data.as_mut_ptr().wrapping_add(offset);
        Ok(Self {
            ptr,
            data,
            shape: Arc::from(shape),
            strides: Arc::from(strides),
            offset,
            order,
        })
    }

    /// A contiguous mutable view of `data` with origin at buffer index 0.
    pub fn from_shape(data: &'a mut [T], shape: &[usize], order: Order) -> Result<Self> {
        let strides = shape2strides(shape, order);
        Self::new(data, shape, &strides, 0, order)
    }

    /// Create without bounds checking.
    ///
    /// # Safety
    /// Caller must ensure all index combinations stay within bounds.
    pub unsafe fn new_unchecked(
        data: &'a mut [T],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        order: Order,
    ) -> Self {
        Self {
            ptr: data.as_mut_ptr().wrapping_add(offset),
            data,
            shape: Arc::from(shape),
            strides: Arc::from(strides),
            offset,
            order,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw const pointer to the element at the view's origin.
    #[inline]
    pub fn ptr(&self) -> *const T {
        self.ptr as *const T
    }

    /// Raw mutable pointer to the element at the view's origin.
    #[inline]
    pub fn as_mut_ptr(&self) -> *mut T {
        self.ptr
    }

    /// Permute dimensions, consuming the mutable view.
    pub fn permute(self, perm: &[usize]) -> Result<ArrayViewMut<'a, T>> {
        check_permutation(perm, self.ndim())?;
        let shape: Vec<usize> = perm.iter().map(|&p| self.shape[p]).collect();
        let strides: Vec<isize> = perm.iter().map(|&p| self.strides[p]).collect();
        Ok(ArrayViewMut {
            ptr: self.ptr,
            data: self.data,
            shape: Arc::from(shape),
            strides: Arc::from(strides),
            offset: self.offset,
            order: self.order,
        })
    }

    /// Reverse the direction of `axis`, consuming the mutable view.
    pub fn flip(self, axis: usize) -> Result<ArrayViewMut<'a, T>> {
        let (offset, strides) = flipped_layout(&self.shape, &self.strides, self.offset, axis)?;
        let data = self.data;
        Ok(ArrayViewMut {
            ptr: data.as_mut_ptr().wrapping_add(offset),
            data,
            shape: self.shape,
            strides: Arc::from(strides),
            offset,
            order: self.order,
        })
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> ArrayView<'_, T> {
        ArrayView {
            ptr: self.ptr as *const T,
            data: &*self.data,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
            order: self.order,
        }
    }
}

impl<T: Element> ArrayViewMut<'_, T> {
    /// Runtime data type of the elements.
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }
}

impl<T: Copy> ArrayViewMut<'_, T> {
    /// Read the element at `indices`.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        let idx = checked_element_offset(&self.shape, &self.strides, indices)?;
        Ok(unsafe { *self.ptr.offset(idx) })
    }

    /// Write the element at `indices`.
    pub fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        let idx = checked_element_offset(&self.shape, &self.strides, indices)?;
        unsafe {
            *self.ptr.offset(idx) = value;
        }
        Ok(())
    }
}

// ============================================================================
// NdArray
// ============================================================================

/// Owned strided multidimensional array.
///
/// The buffer is always contiguous in `order` with origin at index 0.
pub struct NdArray<T> {
    data: Vec<T>,
    shape: Arc<[usize]>,
    strides: Arc<[isize]>,
    order: Order,
}

impl<T> std::fmt::Debug for NdArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NdArray")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("order", &self.order)
            .finish()
    }
}

impl<T: Clone> Clone for NdArray<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            order: self.order,
        }
    }
}

impl<T: Clone + Default> NdArray<T> {
    /// Array of `shape` filled with `T::default()`.
    pub fn zeros(shape: &[usize], order: Order) -> Self {
        Self::filled(shape, T::default(), order)
    }
}

impl<T: Clone> NdArray<T> {
    /// Array of `shape` with every element set to `value`.
    pub fn filled(shape: &[usize], value: T, order: Order) -> Self {
        Self {
            data: vec![value; numel(shape)],
            shape: Arc::from(shape),
            strides: Arc::from(shape2strides(shape, order)),
            order,
        }
    }
}

impl<T> NdArray<T> {
    /// Array with values produced by `f`.
    ///
    /// `f` is called once per element with its multi-index, in the memory
    /// order of the result.
    pub fn from_fn(shape: &[usize], order: Order, mut f: impl FnMut(&[usize]) -> T) -> Self {
        let mut data = Vec::with_capacity(numel(shape));
        crate::multi_index::for_each_multi_index(shape, order, |idx| data.push(f(idx)));
        Self {
            data,
            shape: Arc::from(shape),
            strides: Arc::from(shape2strides(shape, order)),
            order,
        }
    }

    /// Wrap a contiguous buffer laid out in `order`.
    pub fn from_vec(data: Vec<T>, shape: &[usize], order: Order) -> Result<Self> {
        if data.len() != numel(shape) {
            return Err(StridedError::InvalidArgument(format!(
                "buffer of length {} does not match shape {:?}",
                data.len(),
                shape
            )));
        }
        Ok(Self {
            data,
            shape: Arc::from(shape),
            strides: Arc::from(shape2strides(shape, order)),
            order,
        })
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Immutable view over this array.
    pub fn view(&self) -> ArrayView<'_, T> {
        ArrayView {
            ptr: self.data.as_ptr(),
            data: &self.data,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: 0,
            order: self.order,
        }
    }

    /// Mutable view over this array.
    pub fn view_mut(&mut self) -> ArrayViewMut<'_, T> {
        ArrayViewMut {
            ptr: self.data.as_mut_ptr(),
            data: &mut self.data,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: 0,
            order: self.order,
        }
    }

    /// Iterate over all elements in memory order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Mutable iteration over all elements in memory order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    fn buffer_index(&self, indices: &[usize]) -> Result<usize> {
        checked_element_offset(&self.shape, &self.strides, indices).map(|i| i as usize)
    }
}

impl<T: Copy> NdArray<T> {
    /// Read the element at `indices`.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        Ok(self.data[self.buffer_index(indices)?])
    }

    /// Write the element at `indices`.
    pub fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        let i = self.buffer_index(indices)?;
        self.data[i] = value;
        Ok(())
    }
}

impl<T: Element> NdArray<T> {
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }
}

impl<T> Index<&[usize]> for NdArray<T> {
    type Output = T;

    fn index(&self, indices: &[usize]) -> &T {
        match self.buffer_index(indices) {
            Ok(i) => &self.data[i],
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> IndexMut<&[usize]> for NdArray<T> {
    fn index_mut(&mut self, indices: &[usize]) -> &mut T {
        match self.buffer_index(indices) {
            Ok(i) => &mut self.data[i],
            Err(e) => panic!("{e}"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
