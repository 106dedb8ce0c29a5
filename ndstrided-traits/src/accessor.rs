//! Element accessor protocol.
//!
//! Kernels that must work over storage which is not a plain `[T]` (for example
//! complex numbers stored as interleaved `[re, im, re, im, ...]` real buffers)
//! are written against [`Accessor`] / [`AccessorMut`] instead of slice indexing.
//! Plain slices implement the protocol directly, so the choice between the two
//! paths is made once per call by monomorphization rather than per element.

use bytemuck::Pod;
use num_complex::Complex;

/// Read access to a linear buffer of elements.
pub trait Accessor {
    type Item: Copy;

    /// Number of addressable elements.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read element `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    fn get(&self, index: usize) -> Self::Item;
}

/// Write access to a linear buffer of elements.
pub trait AccessorMut: Accessor {
    /// Write element `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    fn set(&mut self, index: usize, value: Self::Item);
}

impl<T: Copy> Accessor for [T] {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> T {
        self[index]
    }
}

impl<T: Copy> AccessorMut for [T] {
    #[inline]
    fn set(&mut self, index: usize, value: T) {
        self[index] = value;
    }
}

impl<T: Copy> Accessor for Vec<T> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> T {
        self[index]
    }
}

impl<T: Copy> AccessorMut for Vec<T> {
    #[inline]
    fn set(&mut self, index: usize, value: T) {
        self[index] = value;
    }
}

impl<A: Accessor + ?Sized> Accessor for &A {
    type Item = A::Item;

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn get(&self, index: usize) -> A::Item {
        (**self).get(index)
    }
}

impl<A: Accessor + ?Sized> Accessor for &mut A {
    type Item = A::Item;

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn get(&self, index: usize) -> A::Item {
        (**self).get(index)
    }
}

impl<A: AccessorMut + ?Sized> AccessorMut for &mut A {
    #[inline]
    fn set(&mut self, index: usize, value: A::Item) {
        (**self).set(index, value)
    }
}

/// Error returned when an interleaved buffer has an odd number of components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interleaved complex buffer must have even length, got {0}")]
pub struct OddInterleavedLength(pub usize);

/// Read-only complex accessor over an interleaved real buffer.
#[derive(Debug, Clone, Copy)]
pub struct Interleaved<'a, F> {
    data: &'a [F],
}

impl<'a, F: Copy> Interleaved<'a, F> {
    /// Wrap `data` without copying; element `i` is `(data[2i], data[2i+1])`.
    pub fn new(data: &'a [F]) -> Result<Self, OddInterleavedLength> {
        if data.len() % 2 != 0 {
            return Err(OddInterleavedLength(data.len()));
        }
        Ok(Self { data })
    }

    /// Underlying real components.
    pub fn as_real(&self) -> &'a [F] {
        self.data
    }
}

impl<'a, F: Pod> Interleaved<'a, F> {
    /// Reinterpret a complex slice as its interleaved real components.
    pub fn from_complex(data: &'a [Complex<F>]) -> Self {
        Self {
            data: bytemuck::cast_slice(data),
        }
    }
}

impl<F: Copy> Accessor for Interleaved<'_, F> {
    type Item = Complex<F>;

    #[inline]
    fn len(&self) -> usize {
        self.data.len() / 2
    }

    #[inline]
    fn get(&self, index: usize) -> Complex<F> {
        Complex::new(self.data[2 * index], self.data[2 * index + 1])
    }
}

/// Mutable complex accessor over an interleaved real buffer.
#[derive(Debug)]
pub struct InterleavedMut<'a, F> {
    data: &'a mut [F],
}

impl<'a, F: Copy> InterleavedMut<'a, F> {
    pub fn new(data: &'a mut [F]) -> Result<Self, OddInterleavedLength> {
        if data.len() % 2 != 0 {
            return Err(OddInterleavedLength(data.len()));
        }
        Ok(Self { data })
    }

    pub fn as_real(&self) -> &[F] {
        self.data
    }

    pub fn as_real_mut(&mut self) -> &mut [F] {
        self.data
    }
}

impl<'a, F: Pod> InterleavedMut<'a, F> {
    pub fn from_complex(data: &'a mut [Complex<F>]) -> Self {
        Self {
            data: bytemuck::cast_slice_mut(data),
        }
    }
}

impl<F: Copy> Accessor for InterleavedMut<'_, F> {
    type Item = Complex<F>;

    #[inline]
    fn len(&self) -> usize {
        self.data.len() / 2
    }

    #[inline]
    fn get(&self, index: usize) -> Complex<F> {
        Complex::new(self.data[2 * index], self.data[2 * index + 1])
    }
}

impl<F: Copy> AccessorMut for InterleavedMut<'_, F> {
    #[inline]
    fn set(&mut self, index: usize, value: Complex<F>) {
        self.data[2 * index] = value.re;
        self.data[2 * index + 1] = value.im;
    }
}

/// Conversion into an [`Accessor`].
///
/// The conversion never copies element storage, and converting something that
/// is already an accessor returns it unchanged.
pub trait IntoAccessor {
    type Accessor: Accessor;

    fn into_accessor(self) -> Self::Accessor;
}

impl<'a, A: Accessor + ?Sized> IntoAccessor for &'a A {
    type Accessor = &'a A;

    #[inline]
    fn into_accessor(self) -> &'a A {
        self
    }
}

impl<'a, F: Copy> IntoAccessor for Interleaved<'a, F> {
    type Accessor = Interleaved<'a, F>;

    #[inline]
    fn into_accessor(self) -> Self {
        self
    }
}

/// Conversion into an [`AccessorMut`].
pub trait IntoAccessorMut {
    type Accessor: AccessorMut;

    fn into_accessor_mut(self) -> Self::Accessor;
}

impl<'a, A: AccessorMut + ?Sized> IntoAccessorMut for &'a mut A {
    type Accessor = &'a mut A;

    #[inline]
    fn into_accessor_mut(self) -> &'a mut A {
        self
    }
}

impl<'a, F: Copy> IntoAccessorMut for InterleavedMut<'a, F> {
    type Accessor = InterleavedMut<'a, F>;

    #[inline]
    fn into_accessor_mut(self) -> Self {
        self
    }
}
