use std::fmt;
use std::str::FromStr;

use crate::StridedError;

/// Memory layout order of an array.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Order {
    /// C-like layout: last axis varies fastest.
    #[default]
    RowMajor,
    /// Fortran-like layout: first axis varies fastest.
    ColumnMajor,
}

impl Order {
    pub const fn as_str(self) -> &'static str {
        match self {
            Order::RowMajor => "row-major",
            Order::ColumnMajor => "column-major",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Order {
    type Err = StridedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "row-major" => Ok(Order::RowMajor),
            "column-major" => Ok(Order::ColumnMajor),
            _ => Err(StridedError::InvalidArgument(format!(
                "order must be `row-major` or `column-major`, got `{s}`"
            ))),
        }
    }
}

/// Classification of a stride array, as returned by [`strides2order`].
///
/// [`strides2order`]: crate::shape::strides2order
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StrideOrder {
    RowMajor,
    ColumnMajor,
    /// Strides are compatible with both orders (rank <= 1 or equal magnitudes).
    Both,
    Neither,
}

impl StrideOrder {
    /// The [`Order`] this classification implies, if it implies exactly one.
    pub fn as_order(self) -> Option<Order> {
        match self {
            StrideOrder::RowMajor => Some(Order::RowMajor),
            StrideOrder::ColumnMajor => Some(Order::ColumnMajor),
            StrideOrder::Both | StrideOrder::Neither => None,
        }
    }
}
