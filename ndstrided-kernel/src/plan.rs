//! Loop planning: axis order, fusion and cache tiles.
//!
//! A [`LoopPlan`] rewrites an iteration space shared by several strided arrays
//! into an equivalent one that is cheaper to walk. Array 0 is always the
//! output. The plan's axes run innermost first.

use crate::walk::walk_tiles;
use crate::{Result, BLOCK_MEMORY_SIZE, CACHE_LINE_SIZE};

/// Iteration space after reordering, fusing and tiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LoopPlan {
    pub(crate) dims: Vec<usize>,
    /// One stride list per array, aligned with `dims`.
    pub(crate) strides: Vec<Vec<isize>>,
    pub(crate) blocks: Vec<usize>,
}

impl LoopPlan {
    pub(crate) fn new(dims: &[usize], strides_list: &[&[isize]], elem_size: usize) -> Self {
        let axes = axis_order(dims, strides_list);
        let (dims_f, strides_f) = fuse_axes(&axes, dims, strides_list);
        let blocks = tile_sizes(&dims_f, &strides_f, elem_size.max(1));
        tracing::trace!(
            dims = ?dims,
            order = ?axes,
            fused = ?dims_f,
            blocks = ?blocks,
            "planned loop nest"
        );
        Self {
            dims: dims_f,
            strides: strides_f,
            blocks,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.dims.iter().product()
    }

    /// Walk the plan starting at `origin` (one element offset per array).
    pub(crate) fn walk<F>(&self, origin: &[isize], f: F) -> Result<()>
    where
        F: FnMut(&[isize], usize, &[isize]) -> Result<()>,
    {
        walk_tiles(&self.dims, &self.blocks, &self.strides, origin, f)
    }
}

/// 0-based rank of each stride magnitude among the non-zero strides.
/// Zero strides rank 0 alongside the smallest one.
fn stride_ranks(strides: &[isize]) -> Vec<usize> {
    strides
        .iter()
        .map(|&s| {
            if s == 0 {
                return 0;
            }
            let mag = s.unsigned_abs();
            strides
                .iter()
                .filter(|&&t| t != 0 && t.unsigned_abs() < mag)
                .count()
        })
        .collect()
}

/// Axis permutation, innermost first.
///
/// Every array votes with the rank of its stride on each axis and the output's
/// vote counts double; the lowest total goes innermost. Axes of size 0 or 1
/// go last. Ties keep their original order.
fn axis_order(dims: &[usize], strides_list: &[&[isize]]) -> Vec<usize> {
    let mut score = vec![0usize; dims.len()];
    for (k, strides) in strides_list.iter().enumerate() {
        let weight = if k == 0 { 2 } else { 1 };
        for (acc, r) in score.iter_mut().zip(stride_ranks(strides)) {
            *acc += weight * r;
        }
    }
    let mut axes: Vec<usize> = (0..dims.len()).collect();
    axes.sort_by_key(|&d| (dims[d] <= 1, score[d]));
    axes
}

/// Take `axes` in order, drop size-1 axes and merge each axis into the
/// previous one when it continues that run in every array.
fn fuse_axes(
    axes: &[usize],
    dims: &[usize],
    strides_list: &[&[isize]],
) -> (Vec<usize>, Vec<Vec<isize>>) {
    let mut out_dims: Vec<usize> = Vec::with_capacity(axes.len());
    let mut out_strides: Vec<Vec<isize>> =
        vec![Vec::with_capacity(axes.len()); strides_list.len()];

    for &d in axes {
        let n = dims[d];
        if n == 1 {
            continue;
        }
        let continues_run = out_dims.last().is_some_and(|&run| {
            strides_list
                .iter()
                .zip(&out_strides)
                .all(|(s, acc)| acc.last().is_some_and(|&base| s[d] == base * run as isize))
        });
        match (continues_run, out_dims.last_mut()) {
            (true, Some(run)) => *run *= n,
            _ => {
                out_dims.push(n);
                for (acc, s) in out_strides.iter_mut().zip(strides_list) {
                    acc.push(s[d]);
                }
            }
        }
    }
    (out_dims, out_strides)
}

/// Split cost per axis: the smallest stride magnitude over all arrays,
/// doubled, or 1 if some array broadcasts along the axis.
pub(crate) fn split_costs(strides: &[Vec<isize>]) -> Vec<isize> {
    let rank = strides.first().map_or(0, Vec::len);
    (0..rank)
        .map(|d| match strides.iter().map(|s| s[d].abs()).min() {
            Some(0) | None => 1,
            Some(m) => 2 * m,
        })
        .collect()
}

/// Bytes of cache touched by one tile of shape `tile`, summed over arrays.
///
/// Strides shorter than a cache line extend a single run of lines; longer
/// strides multiply the number of runs.
fn tile_footprint(tile: &[usize], byte_strides: &[Vec<usize>]) -> usize {
    byte_strides
        .iter()
        .map(|bs| {
            let mut span = 0usize;
            let mut runs = 1usize;
            for (&n, &b) in tile.iter().zip(bs) {
                if b < CACHE_LINE_SIZE {
                    span += n.saturating_sub(1) * b;
                } else {
                    runs = runs.saturating_mul(n);
                }
            }
            (span / CACHE_LINE_SIZE + 1)
                .saturating_mul(CACHE_LINE_SIZE)
                .saturating_mul(runs)
        })
        .fold(0usize, usize::saturating_add)
}

/// Whether `axis` has the smallest stride among `axis..` in every array.
fn fastest_everywhere(axis: usize, byte_strides: &[Vec<usize>]) -> bool {
    byte_strides.iter().all(|bs| {
        bs[axis] == 0
            || bs[axis..]
                .iter()
                .filter(|&&b| b != 0)
                .all(|&b| bs[axis] <= b)
    })
}

/// Tile extent per axis so that one tile of every array fits in
/// [`BLOCK_MEMORY_SIZE`].
fn tile_sizes(dims: &[usize], strides: &[Vec<isize>], elem_size: usize) -> Vec<usize> {
    let byte_strides: Vec<Vec<usize>> = strides
        .iter()
        .map(|s| s.iter().map(|&x| x.unsigned_abs() * elem_size).collect())
        .collect();
    let costs = split_costs(strides);
    let mut tile = dims.to_vec();

    // Leading axes that are fastest for every array stay whole.
    let mut first = 0;
    loop {
        let tail: Vec<Vec<usize>> = byte_strides.iter().map(|b| b[first..].to_vec()).collect();
        if first == dims.len() || tile_footprint(&tile[first..], &tail) <= BLOCK_MEMORY_SIZE {
            return tile;
        }
        if !fastest_everywhere(first, &byte_strides) {
            break;
        }
        first += 1;
    }

    let tail: Vec<Vec<usize>> = byte_strides.iter().map(|b| b[first..].to_vec()).collect();
    let smallest = tail.iter().flatten().copied().min().unwrap_or(0);
    if smallest > BLOCK_MEMORY_SIZE {
        tile[first..].fill(1);
        return tile;
    }

    let costs = &costs[first..];
    let shrink_target = |tile: &[usize]| {
        tile.iter()
            .zip(costs)
            .enumerate()
            .filter(|(_, (&n, _))| n > 1)
            .max_by_key(|&(i, (&n, &c))| ((n as isize - 1) * c, i))
            .map(|(i, _)| i)
    };
    while tile_footprint(&tile[first..], &tail) >= 2 * BLOCK_MEMORY_SIZE {
        let Some(i) = shrink_target(&tile[first..]) else {
            break;
        };
        tile[first + i] = tile[first + i].div_ceil(2);
    }
    while tile_footprint(&tile[first..], &tail) > BLOCK_MEMORY_SIZE {
        let Some(i) = shrink_target(&tile[first..]) else {
            break;
        };
        tile[first + i] -= 1;
    }
    tile
}
