//! Strided views over [`Accessor`] storage.
//!
//! These mirror [`ArrayView`](crate::ArrayView) / [`ArrayViewMut`](crate::ArrayViewMut)
//! but read and write through the accessor protocol instead of raw pointers,
//! so the same layout can describe interleaved complex buffers or any other
//! non-slice storage.

use std::sync::Arc;

use ndstrided_traits::{Accessor, AccessorMut, IntoAccessor, IntoAccessorMut};

use crate::broadcast::broadcast_strides;
use crate::order::Order;
use crate::shape::{numel, shape2strides};
use crate::view::{checked_element_offset, validate_bounds};
use crate::Result;

/// Immutable strided view over an accessor.
#[derive(Clone)]
pub struct AccessorView<A> {
    acc: A,
    shape: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: usize,
    order: Order,
}

impl<A: Accessor> AccessorView<A> {
    pub fn new<S>(
        storage: S,
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        order: Order,
    ) -> Result<Self>
    where
        S: IntoAccessor<Accessor = A>,
    {
        let acc = storage.into_accessor();
        validate_bounds(acc.len(), shape, strides, offset)?;
        Ok(Self {
            acc,
            shape: Arc::from(shape),
            strides: Arc::from(strides),
            offset,
            order,
        })
    }

    /// A contiguous view with origin at index 0.
    pub fn from_shape<S>(storage: S, shape: &[usize], order: Order) -> Result<Self>
    where
        S: IntoAccessor<Accessor = A>,
    {
        let strides = shape2strides(shape, order);
        Self::new(storage, shape, &strides, 0, order)
    }

    #[inline]
    pub fn accessor(&self) -> &A {
        &self.acc
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

    /// Read the element at `indices`.
    pub fn get(&self, indices: &[usize]) -> Result<A::Item> {
        let idx = checked_element_offset(&self.shape, &self.strides, indices)?;
        Ok(self.acc.get((self.offset as isize + idx) as usize))
    }
}

impl<A: Accessor + Clone> AccessorView<A> {
    /// Broadcast to `target_shape`; expanded dimensions get stride 0.
    pub fn broadcast_to(&self, target_shape: &[usize]) -> Result<AccessorView<A>> {
        let strides = broadcast_strides(target_shape, &self.shape, &self.strides)?;
        Ok(AccessorView {
            acc: self.acc.clone(),
            shape: Arc::from(target_shape),
            strides: Arc::from(strides),
            offset: self.offset,
            order: self.order,
        })
    }
}

/// Mutable strided view over an accessor.
pub struct AccessorViewMut<A> {
    acc: A,
    shape: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: usize,
    order: Order,
}

impl<A: AccessorMut> AccessorViewMut<A> {
    pub fn new<S>(
        storage: S,
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        order: Order,
    ) -> Result<Self>
    where
        S: IntoAccessorMut<Accessor = A>,
    {
        let acc = storage.into_accessor_mut();
        validate_bounds(acc.len(), shape, strides, offset)?;
        Ok(Self {
            acc,
            shape: Arc::from(shape),
            strides: Arc::from(strides),
            offset,
            order,
        })
    }

    /// A contiguous view with origin at index 0.
    pub fn from_shape<S>(storage: S, shape: &[usize], order: Order) -> Result<Self>
    where
        S: IntoAccessorMut<Accessor = A>,
    {
        let strides = shape2strides(shape, order);
        Self::new(storage, shape, &strides, 0, order)
    }

    #[inline]
    pub fn accessor(&self) -> &A {
        &self.acc
    }

    #[inline]
    pub fn accessor_mut(&mut self) -> &mut A {
        &mut self.acc
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

    pub fn get(&self, indices: &[usize]) -> Result<A::Item> {
        let idx = checked_element_offset(&self.shape, &self.strides, indices)?;
        Ok(self.acc.get((self.offset as isize + idx) as usize))
    }

    pub fn set(&mut self, indices: &[usize], value: A::Item) -> Result<()> {
        let idx = checked_element_offset(&self.shape, &self.strides, indices)?;
        self.acc.set((self.offset as isize + idx) as usize, value);
        Ok(())
    }
}
