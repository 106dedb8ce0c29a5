use std::fmt;
use std::str::FromStr;

use crate::{Result, StridedError};

/// Policy for indices which fall outside of `[0, max]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum IndexMode {
    /// Out-of-range indices are an error.
    #[default]
    Throw,
    /// Wrap around using Euclidean modulo.
    Wrap,
    /// Clamp into `[0, max]`.
    Clamp,
    /// Negative indices count from the end; still out of range is an error.
    Normalize,
}

impl IndexMode {
    /// Resolve `idx` against the inclusive upper bound `max`.
    ///
    /// `max` is `len - 1`; resolving against an empty extent (`max < 0`) fails
    /// for every mode.
    pub fn resolve(self, idx: isize, max: isize) -> Result<usize> {
        if max < 0 {
            return Err(StridedError::IndexOutOfRange { index: idx, max });
        }
        let resolved = match self {
            IndexMode::Throw => {
                if idx < 0 || idx > max {
                    return Err(StridedError::IndexOutOfRange { index: idx, max });
                }
                idx
            }
            IndexMode::Wrap => idx.rem_euclid(max + 1),
            IndexMode::Clamp => idx.clamp(0, max),
            IndexMode::Normalize => {
                let i = if idx < 0 { idx + max + 1 } else { idx };
                if i < 0 || i > max {
                    return Err(StridedError::IndexOutOfRange { index: idx, max });
                }
                i
            }
        };
        Ok(resolved as usize)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            IndexMode::Throw => "throw",
            IndexMode::Wrap => "wrap",
            IndexMode::Clamp => "clamp",
            IndexMode::Normalize => "normalize",
        }
    }
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexMode {
    type Err = StridedError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "throw" => Ok(IndexMode::Throw),
            "wrap" => Ok(IndexMode::Wrap),
            "clamp" => Ok(IndexMode::Clamp),
            "normalize" => Ok(IndexMode::Normalize),
            _ => Err(StridedError::InvalidArgument(format!(
                "unsupported index mode `{s}`"
            ))),
        }
    }
}
