//! Multi-index enumeration.

use crate::order::Order;

/// Odometer over every multi-index of a shape.
///
/// Row-major enumeration advances the last axis first, column-major the first.
/// A 0-d shape yields one empty index; a shape with a zero-size axis yields
/// nothing.
#[derive(Clone, Debug)]
pub struct MultiIndex {
    shape: Vec<usize>,
    order: Order,
    current: Vec<usize>,
    remaining: usize,
}

impl MultiIndex {
    pub fn new(shape: &[usize], order: Order) -> Self {
        Self {
            shape: shape.to_vec(),
            order,
            current: vec![0; shape.len()],
            remaining: shape.iter().product(),
        }
    }

    /// The index the next call to [`advance`](Self::advance) will move past.
    pub fn current(&self) -> Option<&[usize]> {
        (self.remaining > 0).then_some(self.current.as_slice())
    }

    /// Step to the next index; returns `false` once every index was visited.
    pub fn advance(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        let rank = self.shape.len();
        let carry = |axis: usize, idx: &mut [usize]| {
            idx[axis] += 1;
            if idx[axis] == self.shape[axis] {
                idx[axis] = 0;
                true
            } else {
                false
            }
        };
        match self.order {
            Order::RowMajor => {
                for axis in (0..rank).rev() {
                    if !carry(axis, &mut self.current) {
                        break;
                    }
                }
            }
            Order::ColumnMajor => {
                for axis in 0..rank {
                    if !carry(axis, &mut self.current) {
                        break;
                    }
                }
            }
        }
        self.remaining > 0
    }

    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

/// Call `f` on every multi-index of `shape` in `order`.
pub fn for_each_multi_index(shape: &[usize], order: Order, mut f: impl FnMut(&[usize])) {
    let mut it = MultiIndex::new(shape, order);
    while let Some(idx) = it.current() {
        f(idx);
        it.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(shape: &[usize], order: Order) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        for_each_multi_index(shape, order, |i| out.push(i.to_vec()));
        out
    }

    #[test]
    fn test_column_major_moves_first_axis() {
        assert_eq!(
            collect(&[2, 2], Order::ColumnMajor),
            vec![vec![0, 0], vec![1, 0], vec![0, 1], vec![1, 1]]
        );
    }

    #[test]
    fn test_row_major_moves_last_axis() {
        assert_eq!(
            collect(&[2, 3], Order::RowMajor)[..4],
            [vec![0, 0], vec![0, 1], vec![0, 2], vec![1, 0]]
        );
    }

    #[test]
    fn test_degenerate_shapes() {
        assert_eq!(collect(&[], Order::RowMajor), vec![Vec::<usize>::new()]);
        assert!(collect(&[3, 0], Order::RowMajor).is_empty());
        assert!(MultiIndex::new(&[0], Order::ColumnMajor).is_empty());
    }

    #[test]
    fn test_advance_reports_exhaustion() {
        let mut it = MultiIndex::new(&[3], Order::RowMajor);
        assert_eq!(it.len(), 3);
        assert!(it.advance());
        assert!(it.advance());
        assert!(!it.advance());
        assert!(it.current().is_none());
        assert!(!it.advance());
    }
}
