//! Broadcast shape resolution.
//!
//! Shapes are aligned from their trailing dimension and padded with leading
//! ones. In every aligned dimension all sizes other than 1 must agree; the
//! output takes that size (or 1 if every input is 1). An input dimension of
//! size 1 that is expanded receives stride 0, so the same element is read for
//! every output position along it.

use crate::{Result, StridedError};

/// Resolve the common broadcast shape of `shapes`.
///
/// Fails with [`StridedError::ShapeMismatch`] naming the first incompatible
/// output dimension.
pub fn broadcast_shapes(shapes: &[&[usize]]) -> Result<Vec<usize>> {
    let rank = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = vec![1usize; rank];

    for (d, size) in out.iter_mut().enumerate() {
        for shape in shapes {
            // Leading (padded) dimensions have size 1.
            let Some(k) = (d + shape.len()).checked_sub(rank) else {
                continue;
            };
            let n = shape[k];
            if n == 1 {
                continue;
            }
            if *size == 1 {
                *size = n;
            } else if *size != n {
                return Err(StridedError::ShapeMismatch {
                    dim: d,
                    shapes: shapes.iter().map(|s| s.to_vec()).collect(),
                });
            }
        }
    }

    Ok(out)
}

/// Strides that present an array of shape `src_shape` as one of shape
/// `target_shape`.
///
/// Dimensions are right-aligned. Padded leading dimensions and size-1
/// dimensions expanded to a larger size get stride 0; matching dimensions keep
/// their stride.
pub fn broadcast_strides(
    target_shape: &[usize],
    src_shape: &[usize],
    src_strides: &[isize],
) -> Result<Vec<isize>> {
    if src_strides.len() != src_shape.len() {
        return Err(StridedError::StrideLengthMismatch);
    }
    if src_shape.len() > target_shape.len() {
        return Err(StridedError::RankMismatch(
            src_shape.len(),
            target_shape.len(),
        ));
    }

    let pad = target_shape.len() - src_shape.len();
    let mut out = vec![0isize; target_shape.len()];
    for (i, (&n, &s)) in src_shape.iter().zip(src_strides.iter()).enumerate() {
        let d = pad + i;
        let target = target_shape[d];
        if n == target {
            out[d] = s;
        } else if n == 1 {
            out[d] = 0;
        } else {
            return Err(StridedError::ShapeMismatch {
                dim: d,
                shapes: vec![src_shape.to_vec(), target_shape.to_vec()],
            });
        }
    }

    Ok(out)
}
