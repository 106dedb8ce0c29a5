//! Index-aware kernels.
//!
//! These walk the output in its own memory order (`dest.order()`), last axis
//! fastest for row-major, so the callback sees multi-indices in a predictable
//! sequence. They do not use the blocked engine.

use ndstrided_view::{for_each_multi_index, ArrayView, ArrayViewMut};

use crate::walk::{ensure_same_shape, ensure_writable_strides};
use crate::Result;

#[inline]
fn element_offset(idx: &[usize], strides: &[isize]) -> isize {
    idx.iter().zip(strides).map(|(&i, &s)| i as isize * s).sum()
}

/// Visit every element of `view` in the view's order.
///
/// `f` receives the multi-index and the buffer index of the element.
pub fn for_each_index<T>(view: &ArrayView<'_, T>, mut f: impl FnMut(&[usize], usize)) {
    let strides = view.strides();
    let origin = view.offset() as isize;
    for_each_multi_index(view.shape(), view.order(), |idx| {
        f(idx, (origin + element_offset(idx, strides)) as usize)
    });
}

/// `dest[idx] = f(src[idx], idx)` where `f` returns `Some`.
///
/// Returning `None` leaves the output element untouched.
pub fn unary_by_index_into<A, D>(
    dest: &mut ArrayViewMut<'_, D>,
    src: &ArrayView<'_, A>,
    f: impl Fn(A, &[usize]) -> Option<D>,
) -> Result<()>
where
    A: Copy,
    D: Copy,
{
    ensure_same_shape(dest.shape(), src.shape())?;
    ensure_writable_strides(dest.shape(), dest.strides())?;

    let dp = dest.as_mut_ptr();
    let sp = src.ptr();
    let dst_strides = dest.strides();
    let src_strides = src.strides();

    for_each_multi_index(dest.shape(), dest.order(), |idx| unsafe {
        let x = *sp.offset(element_offset(idx, src_strides));
        if let Some(v) = f(x, idx) {
            *dp.offset(element_offset(idx, dst_strides)) = v;
        }
    });
    Ok(())
}
