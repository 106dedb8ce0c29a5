//! Generic fallback kernels.
//!
//! The fallback path reads every input element as a [`Scalar`], evaluates the
//! callback in the promoted kind and converts the result to the output dtype on
//! store. It handles any mix of dtypes, including `generic` arrays, at the cost
//! of per-element conversions.

use ndstrided_view::{
    broadcast_shapes, for_each_multi_index, overlapping_dimension, DynView, DynViewMut, Result,
    Scalar, StridedError,
};

use crate::table::Kernel;

/// Evaluate `f` over the inputs broadcast against the output and store the result.
///
/// Errors are detected before the first write: the input shapes must broadcast
/// to the output shape, and no two output subscripts may share an element.
pub fn generic_nary_into(
    inputs: &[DynView<'_>],
    output: &mut DynViewMut<'_>,
    f: impl Fn(&[Scalar]) -> Scalar,
) -> Result<()> {
    let shape = output.shape().to_vec();
    let mut all_shapes: Vec<&[usize]> = inputs.iter().map(DynView::shape).collect();
    all_shapes.push(&shape);
    let target = broadcast_shapes(&all_shapes)?;
    if target != shape {
        return Err(StridedError::ShapeMismatch {
            dim: first_difference(&target, &shape),
            shapes: vec![shape.clone(), target],
        });
    }
    if let Some(d) = overlapping_dimension(&shape, output.strides()) {
        return Err(StridedError::InvalidArgument(format!(
            "output overlaps itself in dimension {d}"
        )));
    }

    let inputs = inputs
        .iter()
        .map(|v| v.broadcast_to(&shape))
        .collect::<Result<Vec<_>>>()?;

    let mut args = vec![Scalar::default(); inputs.len()];
    let mut status = Ok(());
    for_each_multi_index(&shape, output.order(), |idx| {
        if status.is_err() {
            return;
        }
        status = (|| {
            for (arg, v) in args.iter_mut().zip(&inputs) {
                *arg = v.get_scalar(idx)?;
            }
            output.set_scalar(idx, f(&args))
        })();
    });
    status
}

fn first_difference(a: &[usize], b: &[usize]) -> usize {
    let rank = a.len().max(b.len());
    (0..rank)
        .find(|&d| {
            let x = a.len().checked_sub(rank - d).map(|i| a[i]);
            let y = b.len().checked_sub(rank - d).map(|i| b[i]);
            x != y
        })
        .unwrap_or(0)
}

/// Wrap a scalar callback as a fallback [`Kernel`].
pub fn generic_kernel(name: &str, f: fn(&[Scalar]) -> Scalar) -> Kernel {
    Kernel::new(name, move |inputs, output| generic_nary_into(inputs, output, f))
}
