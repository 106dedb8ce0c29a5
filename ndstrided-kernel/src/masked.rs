//! Masked element-wise kernel.

use ndstrided_view::{ArrayView, ArrayViewMut};

use crate::walk::{ensure_same_shape, ensure_writable_strides, for_each_run};
use crate::Result;

/// `dest[i] = f(src[i])` wherever `mask[i] == 0`.
///
/// A non-zero mask element leaves the corresponding output element untouched.
/// All three views must have the same shape.
pub fn masked_unary_into<A, D>(
    dest: &mut ArrayViewMut<'_, D>,
    src: &ArrayView<'_, A>,
    mask: &ArrayView<'_, u8>,
    f: impl Fn(A) -> D,
) -> Result<()>
where
    A: Copy,
    D: Copy,
{
    ensure_same_shape(dest.shape(), src.shape())?;
    ensure_same_shape(dest.shape(), mask.shape())?;
    ensure_writable_strides(dest.shape(), dest.strides())?;

    let dp = dest.as_mut_ptr();
    let sp = src.ptr();
    let mp = mask.ptr();
    let elem_size = std::mem::size_of::<D>().max(std::mem::size_of::<A>());

    for_each_run(
        dest.shape(),
        &[dest.strides(), src.strides(), mask.strides()],
        elem_size,
        |offsets, len, strides| {
            for i in 0..len as isize {
                unsafe {
                    if *mp.offset(offsets[2] + i * strides[2]) == 0 {
                        *dp.offset(offsets[0] + i * strides[0]) =
                            f(*sp.offset(offsets[1] + i * strides[1]));
                    }
                }
            }
            Ok(())
        },
    )
}
