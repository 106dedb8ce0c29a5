//! Shape and stride arithmetic.
//!
//! Two kinds of linear index appear here:
//!
//! - a *view index* enumerates the elements of a view in its logical order
//!   (`0..numel(shape)`), independent of where they live in memory;
//! - a *buffer index* is a position in the underlying data buffer.
//!
//! [`vind2bind`] and [`bind2vind`] convert between the two. [`sub2ind`] and
//! [`ind2sub`] convert between subscripts and linear indices; when `offset` is
//! zero they treat strides as magnitudes (view index semantics), otherwise they
//! produce and consume true buffer indices.

use crate::index_mode::IndexMode;
use crate::order::{Order, StrideOrder};
use crate::{Result, StridedError};

/// Number of elements in an array of the given shape.
///
/// A 0-d shape (`[]`) has one element; any zero-length dimension gives zero.
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Column-major strides: first index varies fastest.
pub fn col_major_strides(shape: &[usize]) -> Vec<isize> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut s = 1isize;
    for &n in shape {
        strides.push(s);
        s *= n.max(1) as isize;
    }
    strides
}

/// Row-major strides: last index varies fastest.
pub fn row_major_strides(shape: &[usize]) -> Vec<isize> {
    let mut strides = vec![0isize; shape.len()];
    let mut s = 1isize;
    for (stride, &n) in strides.iter_mut().zip(shape.iter()).rev() {
        *stride = s;
        s *= n.max(1) as isize;
    }
    strides
}

/// Contiguous strides for `shape` laid out in `order`.
pub fn shape2strides(shape: &[usize], order: Order) -> Vec<isize> {
    match order {
        Order::RowMajor => row_major_strides(shape),
        Order::ColumnMajor => col_major_strides(shape),
    }
}

/// Buffer index of the first indexed element for a view whose lowest
/// addressed element sits at buffer index 0.
///
/// Each negative stride moves the origin `-stride * (size - 1)` elements into
/// the buffer; e.g. shape `[2, 3, 10]` with strides `[30, -10, 1]` gives `20`.
/// Fails with [`StridedError::OffsetOverflow`] when the origin does not fit in
/// `usize`.
pub fn strides2offset(shape: &[usize], strides: &[isize]) -> Result<usize> {
    shape
        .iter()
        .zip(strides.iter())
        .filter(|(_, &s)| s < 0)
        .try_fold(0usize, |acc, (&n, &s)| {
            s.unsigned_abs()
                .checked_mul(n.saturating_sub(1))
                .and_then(|extent| acc.checked_add(extent))
                .ok_or(StridedError::OffsetOverflow)
        })
}

/// Classify a stride array by memory order (compared by magnitude).
pub fn strides2order(strides: &[isize]) -> StrideOrder {
    let mut row = true;
    let mut col = true;
    for w in strides.windows(2) {
        let (prev, cur) = (w[0].unsigned_abs(), w[1].unsigned_abs());
        if cur > prev {
            row = false;
        } else if cur < prev {
            col = false;
        }
    }
    match (row, col) {
        (true, true) => StrideOrder::Both,
        (true, false) => StrideOrder::RowMajor,
        (false, true) => StrideOrder::ColumnMajor,
        (false, false) => StrideOrder::Neither,
    }
}

/// Iteration direction implied by the stride signs.
///
/// `1` if every stride is non-negative, `-1` if every stride is negative and
/// `0` for mixed signs.
pub fn iteration_order(strides: &[isize]) -> i8 {
    let negative = strides.iter().filter(|&&s| s < 0).count();
    if negative == 0 {
        1
    } else if negative == strides.len() {
        -1
    } else {
        0
    }
}

/// Number of dimensions of size one.
pub fn singleton_dimensions(shape: &[usize]) -> usize {
    shape.iter().filter(|&&n| n == 1).count()
}

/// Number of dimensions whose size is not one.
pub fn nonsingleton_dimensions(shape: &[usize]) -> usize {
    shape.len() - singleton_dimensions(shape)
}

/// A dimension through which two distinct subscripts may reach the same
/// buffer index, or `None` if every element of the view is distinct.
///
/// Size-1 dimensions are ignored and an empty view never overlaps. The
/// remaining dimensions are sorted by stride magnitude and each stride must
/// exceed the span of all smaller ones. Some interleaved layouts that never
/// collide (shape `[3, 2]` with strides `[2, 3]`) are reported as well.
pub fn overlapping_dimension(shape: &[usize], strides: &[isize]) -> Option<usize> {
    if shape.contains(&0) {
        return None;
    }
    let mut dims: Vec<(usize, usize)> = shape
        .iter()
        .zip(strides)
        .enumerate()
        .filter(|(_, (&n, _))| n > 1)
        .map(|(d, (_, &s))| (s.unsigned_abs(), d))
        .collect();
    dims.sort_unstable();
    let mut span = 0usize;
    for (s, d) in dims {
        if s <= span {
            return Some(d);
        }
        span = span.saturating_add(s.saturating_mul(shape[d] - 1));
    }
    None
}

/// Smallest and largest buffer indices a view can address.
///
/// For views with a zero-length dimension both bounds equal `offset`.
pub fn min_max_view_buffer_index(
    shape: &[usize],
    strides: &[isize],
    offset: usize,
) -> Result<(isize, isize)> {
    if shape.len() != strides.len() {
        return Err(StridedError::StrideLengthMismatch);
    }
    let base = isize::try_from(offset).map_err(|_| StridedError::OffsetOverflow)?;
    let (mut min, mut max) = (base, base);
    if shape.iter().any(|&n| n == 0) {
        return Ok((min, max));
    }
    for (&n, &s) in shape.iter().zip(strides.iter()) {
        let extent = s
            .checked_mul(n as isize - 1)
            .ok_or(StridedError::OffsetOverflow)?;
        if extent >= 0 {
            max = max.checked_add(extent).ok_or(StridedError::OffsetOverflow)?;
        } else {
            min = min.checked_add(extent).ok_or(StridedError::OffsetOverflow)?;
        }
    }
    Ok((min, max))
}

fn check_rank(shape: &[usize], strides: &[isize]) -> Result<()> {
    if shape.len() != strides.len() {
        return Err(StridedError::StrideLengthMismatch);
    }
    Ok(())
}

fn to_buffer_index(idx: isize) -> Result<usize> {
    usize::try_from(idx).map_err(|_| StridedError::OutOfBounds {
        index: idx,
        len: 0,
    })
}

/// Resolve a linear index against the number of elements of `shape`.
fn resolve_linear(shape: &[usize], idx: isize, mode: IndexMode) -> Result<isize> {
    let max = numel(shape) as isize - 1;
    Ok(mode.resolve(idx, max)? as isize)
}

/// Shift a buffer index so that the lowest addressed element sits at zero.
fn rebase(shape: &[usize], strides: &[isize], offset: usize, idx: isize) -> Result<isize> {
    let origin = isize::try_from(strides2offset(shape, strides)?)
        .map_err(|_| StridedError::OffsetOverflow)?;
    Ok(idx - (offset as isize - origin))
}

/// Convert subscripts to a linear index.
///
/// Each subscript is resolved against its dimension with `modes[d % modes.len()]`.
/// With a non-zero `offset` the result is the buffer index
/// `offset + sum(subs[d] * strides[d])`; with `offset == 0` negative strides
/// contribute their magnitude.
pub fn sub2ind(
    shape: &[usize],
    strides: &[isize],
    offset: usize,
    subs: &[isize],
    modes: &[IndexMode],
) -> Result<usize> {
    check_rank(shape, strides)?;
    if subs.len() != shape.len() {
        return Err(StridedError::RankMismatch(subs.len(), shape.len()));
    }
    if modes.is_empty() {
        return Err(StridedError::InvalidArgument(
            "at least one index mode is required".into(),
        ));
    }
    let mut idx = offset as isize;
    for (d, ((&n, &s), &sub)) in shape.iter().zip(strides.iter()).zip(subs.iter()).enumerate() {
        let j = modes[d % modes.len()].resolve(sub, n as isize - 1)? as isize;
        let step = j.checked_mul(s).ok_or(StridedError::OffsetOverflow)?;
        idx = if s < 0 && offset == 0 {
            idx.checked_sub(step)
        } else {
            idx.checked_add(step)
        }
        .ok_or(StridedError::OffsetOverflow)?;
    }
    to_buffer_index(idx)
}

/// Convert a linear index to subscripts.
///
/// See [`ind2sub_assign`].
pub fn ind2sub(
    shape: &[usize],
    strides: &[isize],
    offset: usize,
    order: Order,
    idx: isize,
    mode: IndexMode,
) -> Result<Vec<usize>> {
    let mut out = vec![0usize; shape.len()];
    ind2sub_assign(shape, strides, offset, order, idx, mode, &mut out)?;
    Ok(out)
}

/// Convert a linear index to subscripts, writing them into `out`.
///
/// With `offset == 0`, `idx` is a view index decomposed in `order`. Otherwise
/// `idx` is a buffer index decomposed against `strides`, visiting dimensions
/// from the largest stride to the smallest as implied by `order`.
pub fn ind2sub_assign(
    shape: &[usize],
    strides: &[isize],
    offset: usize,
    order: Order,
    idx: isize,
    mode: IndexMode,
    out: &mut [usize],
) -> Result<()> {
    check_rank(shape, strides)?;
    if out.len() != shape.len() {
        return Err(StridedError::RankMismatch(out.len(), shape.len()));
    }
    let mut idx = resolve_linear(shape, idx, mode)?;

    if offset == 0 {
        let mut place = |d: usize| {
            let n = shape[d] as isize;
            out[d] = (idx % n) as usize;
            idx /= n;
        };
        match order {
            Order::ColumnMajor => (0..shape.len()).for_each(&mut place),
            Order::RowMajor => (0..shape.len()).rev().for_each(&mut place),
        }
        return Ok(());
    }

    idx = rebase(shape, strides, offset, idx)?;
    let mut place = |d: usize| {
        let s = strides[d];
        if s == 0 {
            out[d] = 0;
            return;
        }
        let k = idx / s;
        idx -= k * s;
        out[d] = if s < 0 {
            (shape[d] as isize - 1 + k) as usize
        } else {
            k as usize
        };
    };
    match order {
        Order::RowMajor => (0..shape.len()).for_each(&mut place),
        Order::ColumnMajor => (0..shape.len()).rev().for_each(&mut place),
    }
    Ok(())
}

/// Convert a view index into the corresponding buffer index.
pub fn vind2bind(
    shape: &[usize],
    strides: &[isize],
    offset: usize,
    order: Order,
    idx: isize,
    mode: IndexMode,
) -> Result<usize> {
    check_rank(shape, strides)?;
    let mut idx = resolve_linear(shape, idx, mode)?;
    let mut ind = offset as isize;
    let mut step = |d: usize| -> Result<()> {
        let n = shape[d] as isize;
        ind = (idx % n)
            .checked_mul(strides[d])
            .and_then(|v| ind.checked_add(v))
            .ok_or(StridedError::OffsetOverflow)?;
        idx /= n;
        Ok(())
    };
    match order {
        Order::ColumnMajor => (0..shape.len()).try_for_each(&mut step)?,
        Order::RowMajor => (0..shape.len()).rev().try_for_each(&mut step)?,
    }
    to_buffer_index(ind)
}

/// Convert a buffer index into the corresponding view index.
pub fn bind2vind(
    shape: &[usize],
    strides: &[isize],
    offset: usize,
    order: Order,
    idx: isize,
    mode: IndexMode,
) -> Result<usize> {
    check_rank(shape, strides)?;
    let mut idx = rebase(shape, strides, offset, resolve_linear(shape, idx, mode)?)?;
    let mut ind = 0isize;
    let mut step = |d: usize| {
        let s = strides[d];
        let mut k = 0isize;
        if s != 0 {
            k = idx / s;
            idx -= k * s;
            if s < 0 {
                k += shape[d] as isize - 1;
            }
        }
        ind = ind * shape[d] as isize + k;
    };
    match order {
        Order::RowMajor => (0..shape.len()).for_each(&mut step),
        Order::ColumnMajor => (0..shape.len()).rev().for_each(&mut step),
    }
    to_buffer_index(ind)
}
