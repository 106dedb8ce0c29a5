//! Shared traits for the ndstrided crates.
//!
//! This crate defines the runtime data type enumeration ([`DType`]), the
//! mapping from Rust element types to data types ([`Element`]), the dynamic
//! [`Scalar`] used by generic fallbacks, and the [`Accessor`] protocol through
//! which kernels read and write non-slice storage.

pub mod accessor;
pub mod dtype;
pub mod element;
pub mod scalar;

pub use accessor::{
    Accessor, AccessorMut, IntoAccessor, IntoAccessorMut, Interleaved, InterleavedMut,
    OddInterleavedLength,
};
pub use dtype::{DType, UnrecognizedDataType};
pub use element::Element;
pub use scalar::Scalar;
