//! Splitting a [`LoopPlan`] across rayon tasks.
//!
//! A region is halved along the axis with the largest `(extent - 1) * cost`
//! and both halves go to [`rayon::join`]. Splitting stops when a region holds
//! at most [`MINTHREADLENGTH`] elements, when the thread budget runs out, or
//! when the chosen axis fits in a single tile.

use smallvec::SmallVec;

use crate::plan::{split_costs, LoopPlan};
use crate::walk::walk_tiles;
use crate::{Result, MINTHREADLENGTH};

type Small<T> = SmallVec<[T; 8]>;

/// Raw pointer shared between the tasks of one kernel call.
///
/// # Safety
/// The pointee must outlive the call and tasks must write disjoint elements.
pub(crate) struct SendPtr<T>(pub(crate) *mut T);

impl<T> Clone for SendPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SendPtr<T> {}

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    pub(crate) fn get(self) -> *mut T {
        self.0
    }

    pub(crate) fn get_const(self) -> *const T {
        self.0 as *const T
    }
}

struct Splitter<'a, F> {
    plan: &'a LoopPlan,
    costs: Vec<isize>,
    f: &'a F,
}

impl<F> Splitter<'_, F>
where
    F: Fn(&[isize], usize, &[isize]) -> Result<()> + Sync,
{
    /// Axis to cut: last maximum of `(dims[d] - 1) * cost[d]`.
    fn cut_axis(&self, dims: &[usize]) -> usize {
        dims.iter()
            .zip(&self.costs)
            .enumerate()
            .max_by_key(|&(d, (&n, &c))| ((n as isize - 1) * c, d))
            .map_or(0, |(d, _)| d)
    }

    fn run(&self, dims: &[usize], origin: &[isize], threads: usize) -> Result<()> {
        let total: usize = dims.iter().product();
        let leaf = || walk_tiles(dims, &self.plan.blocks, &self.plan.strides, origin, self.f);
        if threads <= 1 || total <= MINTHREADLENGTH || dims.is_empty() {
            return leaf();
        }

        let axis = self.cut_axis(dims);
        if dims[axis] <= self.plan.blocks[axis].min(1024) {
            return leaf();
        }

        let head = dims[axis] / 2;
        let mut head_dims: Small<usize> = SmallVec::from_slice(dims);
        head_dims[axis] = head;
        let mut tail_dims: Small<usize> = SmallVec::from_slice(dims);
        tail_dims[axis] -= head;
        let tail_origin: Small<isize> = origin
            .iter()
            .zip(&self.plan.strides)
            .map(|(&o, s)| o + head as isize * s[axis])
            .collect();

        let left = threads / 2;
        let (a, b) = rayon::join(
            || self.run(&head_dims, origin, left),
            || self.run(&tail_dims, &tail_origin, threads - left),
        );
        a.and(b)
    }
}

/// Walk `plan` from `origin` on up to `threads` rayon tasks.
///
/// `f` may run concurrently on different runs.
pub(crate) fn par_walk<F>(plan: &LoopPlan, origin: &[isize], threads: usize, f: &F) -> Result<()>
where
    F: Fn(&[isize], usize, &[isize]) -> Result<()> + Sync,
{
    let splitter = Splitter {
        plan,
        costs: split_costs(&plan.strides),
        f,
    };
    splitter.run(&plan.dims, origin, threads)
}
