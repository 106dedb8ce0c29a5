//! Mapping from Rust element types to runtime data types.

use num_complex::Complex;

use crate::dtype::DType;
use crate::scalar::Scalar;

/// A Rust type that can be stored in an array with a known [`DType`].
///
/// `to_scalar`/`from_scalar` are used by the generic fallback kernels; casts
/// follow Rust `as` semantics (saturating float to int, wrapping int to int).
pub trait Element: Copy + Send + Sync + 'static {
    const DTYPE: DType;

    fn to_scalar(self) -> Scalar;

    fn from_scalar(value: Scalar) -> Self;
}

macro_rules! impl_element_signed {
    ($($t:ty => $dt:ident),* $(,)?) => {
        $(impl Element for $t {
            const DTYPE: DType = DType::$dt;

            #[inline]
            fn to_scalar(self) -> Scalar {
                Scalar::Int(self as i64)
            }

            #[inline]
            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Float(v) => v as $t,
                    other => other.to_i64() as $t,
                }
            }
        })*
    };
}

macro_rules! impl_element_unsigned {
    ($($t:ty => $dt:ident),* $(,)?) => {
        $(impl Element for $t {
            const DTYPE: DType = DType::$dt;

            #[inline]
            fn to_scalar(self) -> Scalar {
                Scalar::Uint(self as u64)
            }

            #[inline]
            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Float(v) => v as $t,
                    other => other.to_u64() as $t,
                }
            }
        })*
    };
}

impl_element_signed!(i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64);
impl_element_unsigned!(u8 => Uint8, u16 => Uint16, u32 => Uint32, u64 => Uint64);

impl Element for f64 {
    const DTYPE: DType = DType::Float64;

    #[inline]
    fn to_scalar(self) -> Scalar {
        Scalar::Float(self)
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        value.to_f64()
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::Float32;

    #[inline]
    fn to_scalar(self) -> Scalar {
        Scalar::Float(self as f64)
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        value.to_f64() as f32
    }
}

impl Element for Complex<f64> {
    const DTYPE: DType = DType::Complex128;

    #[inline]
    fn to_scalar(self) -> Scalar {
        Scalar::Complex(self)
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        value.to_complex()
    }
}

impl Element for Complex<f32> {
    const DTYPE: DType = DType::Complex64;

    #[inline]
    fn to_scalar(self) -> Scalar {
        Scalar::Complex(Complex::new(self.re as f64, self.im as f64))
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        let c = value.to_complex();
        Complex::new(c.re as f32, c.im as f32)
    }
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    #[inline]
    fn to_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        value.to_bool()
    }
}

impl Element for Scalar {
    const DTYPE: DType = DType::Generic;

    #[inline]
    fn to_scalar(self) -> Scalar {
        self
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        value
    }
}
