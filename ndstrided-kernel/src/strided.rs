//! 1-D strided kernels.
//!
//! Each array argument is a flat buffer plus a stride and a starting index.
//! Two conventions are supported for the starting index:
//!
//! - [`Vector::new`] / [`VectorMut::new`]: an explicit offset (ndarray style).
//! - [`Vector::blas`] / [`VectorMut::blas`]: the start is derived from the
//!   stride, `(1 - n) * stride` for a negative stride and 0 otherwise, so the
//!   last element sits at index 0 (BLAS style).
//!
//! Element `i` of an array lives at `start + i * stride`. All indices are
//! validated against the buffers before anything is written; `n == 0` is a
//! no-op.

use ndstrided_view::{strides2offset, ArrayView, ArrayViewMut, Order};

use crate::masked::masked_unary_into;
use crate::maybe_sync::{MaybeSendSync, MaybeSync};
use crate::nary;
use crate::Result;

/// Read-only strided vector argument.
#[derive(Debug, Clone, Copy)]
pub struct Vector<'a, T> {
    data: &'a [T],
    stride: isize,
    offset: Option<usize>,
}

impl<'a, T> Vector<'a, T> {
    /// Vector starting at buffer index `offset`.
    pub fn new(data: &'a [T], stride: isize, offset: usize) -> Self {
        Self {
            data,
            stride,
            offset: Some(offset),
        }
    }

    /// Vector whose start is derived from the stride.
    pub fn blas(data: &'a [T], stride: isize) -> Self {
        Self {
            data,
            stride,
            offset: None,
        }
    }

    fn start(&self, n: usize) -> Result<usize> {
        match self.offset {
            Some(offset) => Ok(offset),
            None => strides2offset(&[n], &[self.stride]),
        }
    }

    /// Rank-1 view over the `n` addressed elements.
    pub fn view(&self, n: usize) -> Result<ArrayView<'a, T>> {
        ArrayView::new(self.data, &[n], &[self.stride], self.start(n)?, Order::RowMajor)
    }
}

/// Mutable strided vector argument.
#[derive(Debug)]
pub struct VectorMut<'a, T> {
    data: &'a mut [T],
    stride: isize,
    offset: Option<usize>,
}

impl<'a, T> VectorMut<'a, T> {
    /// Vector starting at buffer index `offset`.
    pub fn new(data: &'a mut [T], stride: isize, offset: usize) -> Self {
        Self {
            data,
            stride,
            offset: Some(offset),
        }
    }

    /// Vector whose start is derived from the stride.
    pub fn blas(data: &'a mut [T], stride: isize) -> Self {
        Self {
            data,
            stride,
            offset: None,
        }
    }

    /// Rank-1 mutable view over the `n` addressed elements.
    pub fn view_mut(self, n: usize) -> Result<ArrayViewMut<'a, T>> {
        let start = match self.offset {
            Some(offset) => offset,
            None => strides2offset(&[n], &[self.stride])?,
        };
        ArrayViewMut::new(self.data, &[n], &[self.stride], start, Order::RowMajor)
    }
}

/// Fill `n` elements of `y` with values produced by `f`.
pub fn nullary<D>(n: usize, y: VectorMut<'_, D>, f: impl Fn() -> D + MaybeSync) -> Result<()>
where
    D: Copy + MaybeSendSync,
{
    let mut y = y.view_mut(n)?;
    nary::nullary_into(&mut y, f)
}

/// `y[i] = f(x[i])` for `i < n`.
pub fn unary<A, D>(
    n: usize,
    x: Vector<'_, A>,
    y: VectorMut<'_, D>,
    f: impl Fn(A) -> D + MaybeSync,
) -> Result<()>
where
    A: Copy + MaybeSendSync,
    D: Copy + MaybeSendSync,
{
    let x = x.view(n)?;
    let mut y = y.view_mut(n)?;
    nary::unary_into(&mut y, &x, f)
}

/// `z[i] = f(x[i], y[i])` for `i < n`.
pub fn binary<A, B, D>(
    n: usize,
    x: Vector<'_, A>,
    y: Vector<'_, B>,
    z: VectorMut<'_, D>,
    f: impl Fn(A, B) -> D + MaybeSync,
) -> Result<()>
where
    A: Copy + MaybeSendSync,
    B: Copy + MaybeSendSync,
    D: Copy + MaybeSendSync,
{
    let x = x.view(n)?;
    let y = y.view(n)?;
    let mut z = z.view_mut(n)?;
    nary::binary_into(&mut z, &x, &y, f)
}

/// `w[i] = f(x[i], y[i], z[i])` for `i < n`.
pub fn ternary<A, B, C, D>(
    n: usize,
    x: Vector<'_, A>,
    y: Vector<'_, B>,
    z: Vector<'_, C>,
    w: VectorMut<'_, D>,
    f: impl Fn(A, B, C) -> D + MaybeSync,
) -> Result<()>
where
    A: Copy + MaybeSendSync,
    B: Copy + MaybeSendSync,
    C: Copy + MaybeSendSync,
    D: Copy + MaybeSendSync,
{
    let (x, y, z) = (x.view(n)?, y.view(n)?, z.view(n)?);
    let mut w = w.view_mut(n)?;
    nary::ternary_into(&mut w, &x, &y, &z, f)
}

/// `v[i] = f(x[i], y[i], z[i], w[i])` for `i < n`.
#[allow(clippy::too_many_arguments)]
pub fn quaternary<A, B, C, E, D>(
    n: usize,
    x: Vector<'_, A>,
    y: Vector<'_, B>,
    z: Vector<'_, C>,
    w: Vector<'_, E>,
    v: VectorMut<'_, D>,
    f: impl Fn(A, B, C, E) -> D + MaybeSync,
) -> Result<()>
where
    A: Copy + MaybeSendSync,
    B: Copy + MaybeSendSync,
    C: Copy + MaybeSendSync,
    E: Copy + MaybeSendSync,
    D: Copy + MaybeSendSync,
{
    let (x, y, z, w) = (x.view(n)?, y.view(n)?, z.view(n)?, w.view(n)?);
    let mut v = v.view_mut(n)?;
    nary::quaternary_into(&mut v, &x, &y, &z, &w, f)
}

/// `u[i] = f(x[i], y[i], z[i], w[i], v[i])` for `i < n`.
#[allow(clippy::too_many_arguments)]
pub fn quinary<A, B, C, E, G, D>(
    n: usize,
    x: Vector<'_, A>,
    y: Vector<'_, B>,
    z: Vector<'_, C>,
    w: Vector<'_, E>,
    v: Vector<'_, G>,
    u: VectorMut<'_, D>,
    f: impl Fn(A, B, C, E, G) -> D + MaybeSync,
) -> Result<()>
where
    A: Copy + MaybeSendSync,
    B: Copy + MaybeSendSync,
    C: Copy + MaybeSendSync,
    E: Copy + MaybeSendSync,
    G: Copy + MaybeSendSync,
    D: Copy + MaybeSendSync,
{
    let (x, y, z, w, v) = (x.view(n)?, y.view(n)?, z.view(n)?, w.view(n)?, v.view(n)?);
    let mut u = u.view_mut(n)?;
    nary::quinary_into(&mut u, &x, &y, &z, &w, &v, f)
}

/// `y[i] = f(x[i])` where `mask[i] == 0`; other elements of `y` are untouched.
pub fn mskunary<A, D>(
    n: usize,
    x: Vector<'_, A>,
    mask: Vector<'_, u8>,
    y: VectorMut<'_, D>,
    f: impl Fn(A) -> D,
) -> Result<()>
where
    A: Copy,
    D: Copy,
{
    let x = x.view(n)?;
    let mask = mask.view(n)?;
    let mut y = y.view_mut(n)?;
    masked_unary_into(&mut y, &x, &mask, f)
}

/// `z[i] = f(x[i], y[i])` where `mask[i] == 0`; other elements of `z` are untouched.
pub fn mskbinary<A, B, D>(
    n: usize,
    x: Vector<'_, A>,
    y: Vector<'_, B>,
    mask: Vector<'_, u8>,
    z: VectorMut<'_, D>,
    f: impl Fn(A, B) -> D,
) -> Result<()>
where
    A: Copy,
    B: Copy,
    D: Copy,
{
    let x = x.view(n)?;
    let y = y.view(n)?;
    let mask = mask.view(n)?;
    let z = z.view_mut(n)?;
    let (sx, sy, sm, sz) = (x.strides()[0], y.strides()[0], mask.strides()[0], z.strides()[0]);
    let (px, py, pm, pz) = (x.ptr(), y.ptr(), mask.ptr(), z.as_mut_ptr());
    for i in 0..n as isize {
        // Bounds were validated by the view constructors.
        unsafe {
            if *pm.offset(i * sm) == 0 {
                *pz.offset(i * sz) = f(*px.offset(i * sx), *py.offset(i * sy));
            }
        }
    }
    Ok(())
}

/// Map-by kernel: `y[i] = f(x[i], i, ix, iy)` where `f` returns `Some`.
///
/// `ix` and `iy` are the buffer indices of element `i` in `x` and `y`.
/// Returning `None` leaves `y[i]` untouched.
pub fn unary_by<A, D>(
    n: usize,
    x: Vector<'_, A>,
    y: VectorMut<'_, D>,
    mut f: impl FnMut(A, usize, usize, usize) -> Option<D>,
) -> Result<()>
where
    A: Copy,
    D: Copy,
{
    let x = x.view(n)?;
    let y = y.view_mut(n)?;
    let (sx, sy) = (x.strides()[0], y.strides()[0]);
    let (ox, oy) = (x.offset() as isize, y.offset() as isize);
    let data = x.data();
    let out = y.as_mut_ptr();
    for i in 0..n {
        let ix = (ox + i as isize * sx) as usize;
        let iy = oy + i as isize * sy;
        if let Some(v) = f(data[ix], i, ix, iy as usize) {
            // `out` points at buffer index `oy`.
            unsafe { *out.offset(iy - oy) = v };
        }
    }
    Ok(())
}
