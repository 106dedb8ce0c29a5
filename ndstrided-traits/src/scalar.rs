//! Dynamically typed scalar values.
//!
//! [`Scalar`] is the element type of `generic` arrays. Generic fallback kernels
//! read every element as a `Scalar`, compute in the promoted kind and cast back
//! on store, which makes them correct for any combination of data types.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;

/// A single value of any supported kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Complex(Complex64),
}

/// Arithmetic kind ordering used for promotion: `Bool < Uint < Int < Float < Complex`.
fn kind_rank(s: &Scalar) -> u8 {
    match s {
        Scalar::Bool(_) => 0,
        Scalar::Uint(_) => 1,
        Scalar::Int(_) => 2,
        Scalar::Float(_) => 3,
        Scalar::Complex(_) => 4,
    }
}

impl Scalar {
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::Bool(b) => b as u8 as f64,
            Scalar::Int(v) => v as f64,
            Scalar::Uint(v) => v as f64,
            Scalar::Float(v) => v,
            Scalar::Complex(c) => c.re,
        }
    }

    pub fn to_i64(self) -> i64 {
        match self {
            Scalar::Bool(b) => b as i64,
            Scalar::Int(v) => v,
            Scalar::Uint(v) => v as i64,
            Scalar::Float(v) => v as i64,
            Scalar::Complex(c) => c.re as i64,
        }
    }

    pub fn to_u64(self) -> u64 {
        match self {
            Scalar::Bool(b) => b as u64,
            Scalar::Int(v) => v as u64,
            Scalar::Uint(v) => v,
            Scalar::Float(v) => v as u64,
            Scalar::Complex(c) => c.re as u64,
        }
    }

    pub fn to_complex(self) -> Complex64 {
        match self {
            Scalar::Complex(c) => c,
            other => Complex64::new(other.to_f64(), 0.0),
        }
    }

    /// Truthiness: non-zero numbers are `true`.
    pub fn to_bool(self) -> bool {
        match self {
            Scalar::Bool(b) => b,
            Scalar::Int(v) => v != 0,
            Scalar::Uint(v) => v != 0,
            Scalar::Float(v) => v != 0.0,
            Scalar::Complex(c) => c.re != 0.0 || c.im != 0.0,
        }
    }

    /// Convert both operands to the wider of their two kinds.
    pub fn promote(a: Scalar, b: Scalar) -> (Scalar, Scalar) {
        let rank = kind_rank(&a).max(kind_rank(&b)).max(1);
        (a.as_kind(rank), b.as_kind(rank))
    }

    fn as_kind(self, rank: u8) -> Scalar {
        match rank {
            0 => Scalar::Bool(self.to_bool()),
            1 => Scalar::Uint(self.to_u64()),
            2 => Scalar::Int(self.to_i64()),
            3 => Scalar::Float(self.to_f64()),
            _ => Scalar::Complex(self.to_complex()),
        }
    }

    /// Absolute value; complex values yield their modulus.
    pub fn abs(self) -> Scalar {
        match self {
            Scalar::Bool(b) => Scalar::Uint(b as u64),
            Scalar::Int(v) => Scalar::Int(v.wrapping_abs()),
            Scalar::Uint(v) => Scalar::Uint(v),
            Scalar::Float(v) => Scalar::Float(v.abs()),
            Scalar::Complex(c) => Scalar::Float(c.norm()),
        }
    }
}

macro_rules! impl_scalar_binop {
    ($trait:ident, $method:ident, $wrapping:ident, $op:tt) => {
        impl $trait for Scalar {
            type Output = Scalar;

            fn $method(self, rhs: Scalar) -> Scalar {
                match Scalar::promote(self, rhs) {
                    (Scalar::Uint(a), Scalar::Uint(b)) => Scalar::Uint(a.$wrapping(b)),
                    (Scalar::Int(a), Scalar::Int(b)) => Scalar::Int(a.$wrapping(b)),
                    (Scalar::Float(a), Scalar::Float(b)) => Scalar::Float(a $op b),
                    (a, b) => Scalar::Complex(a.to_complex() $op b.to_complex()),
                }
            }
        }
    };
}

impl_scalar_binop!(Add, add, wrapping_add, +);
impl_scalar_binop!(Sub, sub, wrapping_sub, -);
impl_scalar_binop!(Mul, mul, wrapping_mul, *);

impl Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        match self {
            Scalar::Bool(b) => Scalar::Int(-(b as i64)),
            Scalar::Int(v) => Scalar::Int(v.wrapping_neg()),
            Scalar::Uint(v) => Scalar::Int((v as i64).wrapping_neg()),
            Scalar::Float(v) => Scalar::Float(-v),
            Scalar::Complex(c) => Scalar::Complex(-c),
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Float(0.0)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Uint(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Complex(c) => write!(f, "{c}"),
        }
    }
}
