//! Assign variant: results scattered into a flat buffer.

use ndstrided_view::{shape2strides, ArrayView, ArrayViewMut, Order, StridedError};

use crate::maybe_sync::{MaybeSendSync, MaybeSync};
use crate::nary::unary_into;
use crate::Result;

/// Apply `f` to every element of `src` and scatter the results into `out`.
///
/// The `k`-th element of `src` in `order` traversal is written to
/// `out[offset + k * increment]`. The destination is validated up front: an
/// index outside of `out` fails with `OutOfBounds` and a zero `increment` over
/// more than one element fails with `InvalidArgument`, before anything is
/// written.
pub fn unary_assign_into<A, D>(
    src: &ArrayView<'_, A>,
    out: &mut [D],
    offset: usize,
    increment: isize,
    order: Order,
    f: impl Fn(A) -> D + MaybeSync,
) -> Result<()>
where
    A: Copy + MaybeSendSync,
    D: Copy + MaybeSendSync,
{
    let shape = src.shape();
    let strides = shape2strides(shape, order)
        .into_iter()
        .map(|s| s.checked_mul(increment).ok_or(StridedError::OffsetOverflow))
        .collect::<Result<Vec<isize>>>()?;
    let mut dest = ArrayViewMut::new(out, shape, &strides, offset, order)?;
    unary_into(&mut dest, src, f)
}
