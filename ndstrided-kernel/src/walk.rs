//! Tiled traversal and the argument checks shared by every kernel.
//!
//! Kernels receive their work as runs: for each run the callback gets the
//! element offset of every array at the start of the run, the run length and
//! the stride of every array along the run.

use ndstrided_view::{overlapping_dimension, Order, StridedError};

use crate::plan::LoopPlan;
use crate::Result;

struct Walker<'a, F> {
    dims: &'a [usize],
    blocks: &'a [usize],
    strides: &'a [Vec<isize>],
    run_strides: Vec<isize>,
    extent: Vec<usize>,
    offsets: Vec<isize>,
    f: F,
}

impl<F> Walker<'_, F>
where
    F: FnMut(&[isize], usize, &[isize]) -> Result<()>,
{
    fn shift(&mut self, axis: usize, steps: isize) {
        for (o, s) in self.offsets.iter_mut().zip(self.strides) {
            *o += steps * s[axis];
        }
    }

    /// Pick the tile along every axis below `level`, outermost first, then
    /// visit the cells of the chosen tile.
    fn tiles(&mut self, level: usize) -> Result<()> {
        let Some(axis) = level.checked_sub(1) else {
            return self.cells(self.dims.len() - 1);
        };
        let n = self.dims[axis];
        let step = self.blocks[axis].clamp(1, n);
        let mut start = 0;
        while start < n {
            let len = step.min(n - start);
            self.extent[axis] = len;
            self.tiles(axis)?;
            self.shift(axis, len as isize);
            start += len;
        }
        self.shift(axis, -(n as isize));
        Ok(())
    }

    fn cells(&mut self, axis: usize) -> Result<()> {
        if axis == 0 {
            return (self.f)(&self.offsets, self.extent[0], &self.run_strides);
        }
        let len = self.extent[axis];
        for _ in 0..len {
            self.cells(axis - 1)?;
            self.shift(axis, 1);
        }
        self.shift(axis, -(len as isize));
        Ok(())
    }
}

/// Visit `dims` tile by tile, handing runs along axis 0 to `f`.
///
/// `dims`, `blocks` and `strides` come from a [`LoopPlan`]. A rank-0 space
/// produces one run of length 1; a space with a zero-size axis produces none.
pub(crate) fn walk_tiles<F>(
    dims: &[usize],
    blocks: &[usize],
    strides: &[Vec<isize>],
    origin: &[isize],
    mut f: F,
) -> Result<()>
where
    F: FnMut(&[isize], usize, &[isize]) -> Result<()>,
{
    if dims.is_empty() {
        return f(origin, 1, &vec![0; origin.len()]);
    }
    if dims.contains(&0) {
        return Ok(());
    }
    let mut walker = Walker {
        dims,
        blocks,
        strides,
        run_strides: strides.iter().map(|s| s[0]).collect(),
        extent: vec![0; dims.len()],
        offsets: origin.to_vec(),
        f,
    };
    walker.tiles(dims.len())
}

pub(crate) fn ensure_same_shape(a: &[usize], b: &[usize]) -> Result<()> {
    if a.len() != b.len() {
        return Err(StridedError::RankMismatch(a.len(), b.len()));
    }
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(dim) => Err(StridedError::ShapeMismatch {
            dim,
            shapes: vec![a.to_vec(), b.to_vec()],
        }),
        None => Ok(()),
    }
}

/// An output may not reach one element through two indices.
///
/// Zero strides and overlapping strides are both rejected; see
/// [`overlapping_dimension`] for the exact test.
pub(crate) fn ensure_writable_strides(dims: &[usize], strides: &[isize]) -> Result<()> {
    match overlapping_dimension(dims, strides) {
        Some(d) => Err(StridedError::InvalidArgument(format!(
            "output view overlaps itself in dimension {d}"
        ))),
        None => Ok(()),
    }
}

/// Whether the strides enumerate `dims` densely when walking `axes` from the
/// fastest. Size-1 axes are ignored.
fn is_dense(dims: &[usize], strides: &[isize], axes: impl Iterator<Item = usize>) -> bool {
    let mut next = 1isize;
    for d in axes {
        if dims[d] <= 1 {
            continue;
        }
        if strides[d] != next {
            return false;
        }
        next = next.saturating_mul(dims[d] as isize);
    }
    true
}

/// The memory order in which every array is dense, if there is one.
///
/// When it exists all arrays can be walked as one flat run with unit stride.
pub(crate) fn shared_dense_order(dims: &[usize], strides_list: &[&[isize]]) -> Option<Order> {
    if strides_list.is_empty() || strides_list.iter().any(|s| s.len() != dims.len()) {
        return None;
    }
    let rank = dims.len();
    [Order::RowMajor, Order::ColumnMajor]
        .into_iter()
        .find(|&order| {
            strides_list.iter().all(|s| match order {
                Order::RowMajor => is_dense(dims, s, (0..rank).rev()),
                Order::ColumnMajor => is_dense(dims, s, 0..rank),
            })
        })
}

/// Whether a call over `total` elements should stay on the calling thread.
#[inline]
pub(crate) fn stays_sequential(total: usize) -> bool {
    #[cfg(feature = "parallel")]
    {
        total <= crate::MINTHREADLENGTH
    }
    #[cfg(not(feature = "parallel"))]
    {
        let _ = total;
        true
    }
}

/// [`shared_dense_order`] for calls that stay on the calling thread.
#[inline]
pub(crate) fn flat_sequential(dims: &[usize], strides_list: &[&[isize]]) -> bool {
    stays_sequential(dims.iter().product()) && shared_dense_order(dims, strides_list).is_some()
}

/// Run `f` over every run of `dims` on the calling thread.
///
/// Offsets are relative to each array's origin and follow `strides_list`,
/// whose first entry is the output.
pub(crate) fn for_each_run<F>(
    dims: &[usize],
    strides_list: &[&[isize]],
    elem_size: usize,
    mut f: F,
) -> Result<()>
where
    F: FnMut(&[isize], usize, &[isize]) -> Result<()>,
{
    let total: usize = dims.iter().product();
    if total == 0 {
        return Ok(());
    }
    let origin = vec![0isize; strides_list.len()];
    if shared_dense_order(dims, strides_list).is_some() {
        return f(&origin, total, &vec![1; strides_list.len()]);
    }
    LoopPlan::new(dims, strides_list, elem_size).walk(&origin, f)
}
