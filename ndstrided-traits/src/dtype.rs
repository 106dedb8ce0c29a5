//! Closed enumeration of the element data types understood by the kernels.
//!
//! A [`DType`] is what the dispatch layer matches on at runtime. Each variant has
//! a canonical string name (`"float64"`, `"complex128"`, ...) and a single
//! character code used in compact kernel signatures (`"dd_d"`).

use std::fmt;
use std::str::FromStr;

/// Error returned when a data type name or code is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized data type: `{0}`")]
pub struct UnrecognizedDataType(pub String);

/// Runtime element data type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    Float64,
    Float32,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    /// Unsigned 8-bit integers which clamp on assignment.
    Uint8c,
    Uint16,
    Uint32,
    Uint64,
    Complex64,
    Complex128,
    Bool,
    /// Dynamically typed values; matches nothing but itself in dispatch tables.
    Generic,
}

impl DType {
    /// Every data type, in canonical order.
    pub const ALL: [DType; 15] = [
        DType::Float64,
        DType::Float32,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::Uint8,
        DType::Uint8c,
        DType::Uint16,
        DType::Uint32,
        DType::Uint64,
        DType::Complex64,
        DType::Complex128,
        DType::Bool,
        DType::Generic,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DType::Float64 => "float64",
            DType::Float32 => "float32",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Uint8 => "uint8",
            DType::Uint8c => "uint8c",
            DType::Uint16 => "uint16",
            DType::Uint32 => "uint32",
            DType::Uint64 => "uint64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
            DType::Bool => "bool",
            DType::Generic => "generic",
        }
    }

    /// Single character code used in compact signatures.
    pub const fn char_code(self) -> char {
        match self {
            DType::Float64 => 'd',
            DType::Float32 => 'f',
            DType::Int8 => 's',
            DType::Int16 => 'k',
            DType::Int32 => 'i',
            DType::Int64 => 'l',
            DType::Uint8 => 'b',
            DType::Uint8c => 'a',
            DType::Uint16 => 't',
            DType::Uint32 => 'u',
            DType::Uint64 => 'v',
            DType::Complex64 => 'c',
            DType::Complex128 => 'z',
            DType::Bool => 'x',
            DType::Generic => 'o',
        }
    }

    pub fn from_char_code(c: char) -> Result<DType, UnrecognizedDataType> {
        DType::ALL
            .iter()
            .copied()
            .find(|dt| dt.char_code() == c)
            .ok_or_else(|| UnrecognizedDataType(c.to_string()))
    }

    /// Size of one element in bytes, or `None` for [`DType::Generic`].
    pub const fn bytes_per_element(self) -> Option<usize> {
        match self {
            DType::Int8 | DType::Uint8 | DType::Uint8c | DType::Bool => Some(1),
            DType::Int16 | DType::Uint16 => Some(2),
            DType::Float32 | DType::Int32 | DType::Uint32 => Some(4),
            DType::Float64 | DType::Int64 | DType::Uint64 | DType::Complex64 => Some(8),
            DType::Complex128 => Some(16),
            DType::Generic => None,
        }
    }

    pub const fn is_complex(self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    pub const fn is_real_floating(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// Real or complex floating-point.
    pub const fn is_floating(self) -> bool {
        self.is_real_floating() || self.is_complex()
    }

    pub const fn is_signed_integer(self) -> bool {
        matches!(self, DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64)
    }

    pub const fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            DType::Uint8 | DType::Uint8c | DType::Uint16 | DType::Uint32 | DType::Uint64
        )
    }

    pub const fn is_integer(self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating()
    }

    /// Numeric and not complex.
    pub const fn is_real(self) -> bool {
        self.is_integer() || self.is_real_floating()
    }

    /// Whether negative values are representable.
    pub const fn is_signed(self) -> bool {
        self.is_signed_integer() || self.is_floating()
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = UnrecognizedDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .iter()
            .copied()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| UnrecognizedDataType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for dt in DType::ALL {
            assert_eq!(dt.as_str().parse::<DType>().unwrap(), dt);
            assert_eq!(DType::from_char_code(dt.char_code()).unwrap(), dt);
        }
    }

    #[test]
    fn test_char_codes_unique() {
        let mut codes: Vec<char> = DType::ALL.iter().map(|d| d.char_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), DType::ALL.len());
    }

    #[test]
    fn test_unrecognized() {
        let err = "float16".parse::<DType>().unwrap_err();
        assert_eq!(err, UnrecognizedDataType("float16".into()));
        assert_eq!(err.to_string(), "unrecognized data type: `float16`");
        assert!(DType::from_char_code('q').is_err());
    }

    #[test]
    fn test_properties() {
        assert_eq!(DType::Complex128.bytes_per_element(), Some(16));
        assert_eq!(DType::Generic.bytes_per_element(), None);
        assert!(DType::Complex64.is_floating());
        assert!(!DType::Complex64.is_real());
        assert!(DType::Uint8c.is_unsigned_integer());
        assert!(DType::Int8.is_signed());
        assert!(!DType::Uint32.is_signed());
        assert!(!DType::Bool.is_numeric());
        assert!(!DType::Generic.is_numeric());
    }
}
