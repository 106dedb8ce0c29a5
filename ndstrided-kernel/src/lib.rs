//! Cache-blocked n-ary iteration kernels over strided views.
//!
//! # ndarray kernels
//!
//! Kernels that take [`ArrayView`]s, write into an [`ArrayViewMut`] and visit
//! every output multi-index exactly once:
//!
//! - [`nullary_into`], [`unary_into`] .. [`quinary_into`]: same-shape inputs
//! - [`broadcast_unary_into`] .. [`broadcast_quinary_into`]: inputs broadcast
//!   against the output shape
//! - [`apply_nary_into`]: any number of inputs of one element type
//! - [`unary_assign_into`]: results scattered into a flat buffer at a chosen
//!   offset and increment
//! - [`masked_unary_into`]: a non-zero mask element leaves the output untouched
//! - [`unary_by_index_into`]: the callback sees the output multi-index
//! - [`accessor_nullary_into`] .. [`accessor_quaternary_into`] and
//!   [`accessor_broadcast_unary_into`] .. [`accessor_broadcast_quaternary_into`]:
//!   the same iteration over [`AccessorView`]s (for example interleaved complex
//!   storage)
//!
//! # 1-D strided kernels
//!
//! [`strided`] holds the flat kernels taking an element count and a stride
//! (plus an explicit offset, or a BLAS-style start derived from the stride).
//!
//! # Cache Optimization
//!
//! Dimensions are ordered by stride importance, contiguous dimensions are fused
//! and the iteration space is blocked into tiles that fit [`BLOCK_MEMORY_SIZE`].
//! Views sharing one contiguous layout bypass the blocking machinery.
//!
//! # Features
//!
//! - `parallel`: split iteration spaces larger than [`MINTHREADLENGTH`] across
//!   rayon tasks. Element types and callbacks then need `Send + Sync`.
//! - `simd`: run contiguous inner loops through `pulp` runtime dispatch.
//!
//! [`ArrayView`]: ndstrided_view::ArrayView
//! [`ArrayViewMut`]: ndstrided_view::ArrayViewMut
//! [`AccessorView`]: ndstrided_view::AccessorView

mod plan;
mod simd;
#[cfg(feature = "parallel")]
mod threading;
mod walk;

pub mod accessor;
pub mod assign;
pub mod indexed;
pub mod masked;
pub mod maybe_sync;
pub mod nary;
pub mod strided;

pub use accessor::{
    accessor_binary_into, accessor_broadcast_binary_into, accessor_broadcast_quaternary_into,
    accessor_broadcast_ternary_into, accessor_broadcast_unary_into, accessor_nullary_into,
    accessor_quaternary_into, accessor_ternary_into, accessor_unary_into,
};
pub use assign::unary_assign_into;
pub use indexed::{for_each_index, unary_by_index_into};
pub use masked::masked_unary_into;
pub use maybe_sync::{MaybeSend, MaybeSendSync, MaybeSync};
pub use nary::{
    apply_nary_into, binary_into, broadcast_binary_into, broadcast_quaternary_into,
    broadcast_quinary_into, broadcast_ternary_into, broadcast_unary_into, nullary_into,
    quaternary_into, quinary_into, ternary_into, unary_into,
};

pub use ndstrided_view::{Result, StridedError};

// ============================================================================
// Constants
// ============================================================================

/// Block memory size for cache-optimized iteration (L1 cache target).
///
/// Operations are blocked into tiles that fit within this size to maximize cache hits.
pub const BLOCK_MEMORY_SIZE: usize = 32 * 1024;

/// Cache line size in bytes.
pub const CACHE_LINE_SIZE: usize = 64;

/// Minimum number of elements before the iteration space is split across threads.
pub const MINTHREADLENGTH: usize = 1 << 15;
