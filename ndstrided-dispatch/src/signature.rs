//! Kernel signatures.

use std::fmt;

use ndstrided_traits::DType;
use ndstrided_view::{Result, StridedError};

/// Input dtypes and output dtype of one kernel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    inputs: Vec<DType>,
    output: DType,
}

impl Signature {
    pub fn new(inputs: &[DType], output: DType) -> Self {
        Self {
            inputs: inputs.to_vec(),
            output,
        }
    }

    /// Parse dtype names, inputs first and the output last.
    ///
    /// ```
    /// use ndstrided_dispatch::Signature;
    /// use ndstrided_traits::DType;
    ///
    /// let sig = Signature::from_names(&["float64", "int32", "float64"]).unwrap();
    /// assert_eq!(sig.inputs(), &[DType::Float64, DType::Int32]);
    /// assert_eq!(sig.output(), DType::Float64);
    /// ```
    pub fn from_names(names: &[&str]) -> Result<Self> {
        let (output, inputs) = names.split_last().ok_or_else(|| {
            StridedError::InvalidArgument("signature needs at least an output dtype".into())
        })?;
        let inputs = inputs
            .iter()
            .map(|name| name.parse::<DType>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            inputs,
            output: output.parse()?,
        })
    }

    /// Parse the compact form `"<input codes>_<output code>"`, e.g. `"dd_d"`.
    pub fn from_chars(code: &str) -> Result<Self> {
        let (inputs, output) = code.split_once('_').ok_or_else(|| {
            StridedError::InvalidArgument(format!("malformed signature `{code}`"))
        })?;
        let mut out_chars = output.chars();
        let (Some(output), None) = (out_chars.next(), out_chars.next()) else {
            return Err(StridedError::InvalidArgument(format!(
                "signature `{code}` must have exactly one output dtype"
            )));
        };
        let inputs = inputs
            .chars()
            .map(DType::from_char_code)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            inputs,
            output: DType::from_char_code(output)?,
        })
    }

    /// Compact form, the inverse of [`Signature::from_chars`].
    pub fn to_chars(&self) -> String {
        let mut s: String = self.inputs.iter().map(|d| d.char_code()).collect();
        s.push('_');
        s.push(self.output.char_code());
        s
    }

    #[inline]
    pub fn inputs(&self) -> &[DType] {
        &self.inputs
    }

    #[inline]
    pub fn output(&self) -> DType {
        self.output
    }

    /// Number of inputs.
    #[inline]
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Exact match against runtime dtypes.
    #[inline]
    pub fn matches(&self, inputs: &[DType], output: DType) -> bool {
        self.output == output && self.inputs == inputs
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, d) in self.inputs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ") -> {}", self.output)
    }
}
