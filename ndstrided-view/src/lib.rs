//! Strided array views for the ndstrided kernels.
//!
//! # Data model
//!
//! An array view is a borrowed buffer plus a `shape`, per-dimension `strides`
//! (in elements, possibly negative or zero), the buffer `offset` of the logical
//! origin and a memory `order`. Element `idx` of the view lives at
//! `offset + sum(idx[d] * strides[d])`. Views never own or reallocate the
//! buffer; [`NdArray`] is the owning companion type.
//!
//! - [`ArrayView`] / [`ArrayViewMut`]: typed views over `[T]`
//! - [`AccessorView`] / [`AccessorViewMut`]: views over any [`Accessor`] storage
//! - [`DynView`] / [`DynViewMut`]: runtime-typed views used by the dispatch layer
//!
//! # Shape arithmetic
//!
//! [`shape`] holds the index conversion routines ([`numel`], [`strides2offset`],
//! [`sub2ind`], [`ind2sub`], [`vind2bind`], [`bind2vind`], ...), and
//! [`broadcast`] resolves NumPy-style broadcast shapes and strides.
//!
//! [`Accessor`]: ndstrided_traits::Accessor

pub mod accessor_view;
pub mod broadcast;
pub mod dynview;
pub mod index_mode;
pub mod multi_index;
pub mod order;
pub mod shape;
pub mod view;

pub use accessor_view::{AccessorView, AccessorViewMut};
pub use broadcast::{broadcast_shapes, broadcast_strides};
pub use dynview::{DynElement, DynView, DynViewMut};
pub use index_mode::IndexMode;
pub use multi_index::{for_each_multi_index, MultiIndex};
pub use order::{Order, StrideOrder};
pub use shape::{
    bind2vind, col_major_strides, ind2sub, ind2sub_assign, iteration_order,
    min_max_view_buffer_index, nonsingleton_dimensions, numel, overlapping_dimension,
    row_major_strides, shape2strides, singleton_dimensions, strides2offset, strides2order,
    sub2ind, vind2bind,
};
pub use view::{ArrayView, ArrayViewMut, NdArray};

pub use ndstrided_traits::{DType, Element, Scalar, UnrecognizedDataType};

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur while building views or running kernels over them.
///
/// Every error is raised before any element of an output buffer is written.
#[derive(Debug, thiserror::Error)]
pub enum StridedError {
    /// A malformed argument (bad mode, bad signature arity, aliasing output, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Array ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Shapes cannot be broadcast together (or differ where equality is required).
    #[error("shape mismatch in dimension {dim}: {shapes:?}")]
    ShapeMismatch { dim: usize, shapes: Vec<Vec<usize>> },

    /// Stride array length doesn't match the number of dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// Axis index is out of range or repeated.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// A view would address an element outside of its buffer.
    #[error("buffer index {index} out of bounds for buffer of length {len}")]
    OutOfBounds { index: isize, len: usize },

    /// Integer overflow while computing a buffer index.
    #[error("offset overflow while computing buffer index")]
    OffsetOverflow,

    /// A linear index or subscript outside of `[0, max]` under `IndexMode::Throw`.
    #[error("index {index} out of range [0, {max}]")]
    IndexOutOfRange { index: isize, max: isize },

    /// A data type name or code could not be resolved.
    #[error(transparent)]
    UnrecognizedDataType(#[from] UnrecognizedDataType),

    /// A runtime-typed view does not hold the requested element type.
    #[error("dtype mismatch: expected {expected}, got {actual}")]
    DTypeMismatch { expected: DType, actual: DType },

    /// No dispatch table entry matched and no fallback was installed.
    #[error("no kernel registered for signature {signature}")]
    NoMatchingKernel { signature: String },
}

/// Result type for view and kernel operations.
pub type Result<T> = std::result::Result<T, StridedError>;
