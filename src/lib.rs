//! Strided n-dimensional array kernels with broadcasting and dtype dispatch.
//!
//! This crate re-exports the ndstrided family:
//!
//! - [`ndstrided_traits`]: [`DType`], [`Element`], [`Scalar`] and the accessor protocol
//! - [`ndstrided_view`]: shape/stride arithmetic, broadcasting, typed and
//!   runtime-typed views, [`NdArray`]
//! - [`ndstrided_kernel`]: cache-blocked element-wise kernels over views
//! - [`ndstrided_dispatch`]: dtype dispatch tables and prebuilt [`ops`]
//!
//! # Core Types
//!
//! - [`ArrayView`] / [`ArrayViewMut`]: borrowed strided views (negative and
//!   zero strides allowed)
//! - [`DynView`] / [`DynViewMut`]: views tagged with their runtime [`DType`]
//! - [`Dispatcher`]: selects a kernel from the dtypes of its arguments
//!
//! # Example
//!
//! ```rust
//! use ndstrided::{broadcast_binary_into, NdArray, Order};
//!
//! // Broadcast [1, 1, 2] and [2, 1, 1] into [2, 2, 2]
//! let a = NdArray::filled(&[1, 1, 2], 1.0f64, Order::RowMajor);
//! let b = NdArray::filled(&[2, 1, 1], 1.0f64, Order::RowMajor);
//! let mut out = NdArray::<f64>::zeros(&[2, 2, 2], Order::RowMajor);
//!
//! broadcast_binary_into(&mut out.view_mut(), &a.view(), &b.view(), |x, y| x + y).unwrap();
//! assert!(out.iter().all(|&x| x == 2.0));
//! ```
//!
//! # Dispatch Example
//!
//! ```rust
//! use ndstrided::{ops, KernelId, NdArray, Order};
//!
//! let a = NdArray::<f32>::from_vec(vec![-1.0, 2.0], &[2], Order::RowMajor).unwrap();
//! let mut out = NdArray::<f32>::zeros(&[2], Order::RowMajor);
//! let id = ops::abs(a.view().into(), &mut out.view_mut().into()).unwrap();
//! assert!(matches!(id, KernelId::Entry(_)));
//! assert_eq!(out.data(), &[1.0, 2.0]);
//! ```
//!
//! # Cache Optimization
//!
//! - Dimensions are fused and sorted by stride magnitude
//! - Iteration is blocked into tiles fitting L1 cache ([`BLOCK_MEMORY_SIZE`] = 32KB)
//! - Views sharing one contiguous layout bypass the blocking machinery

pub use ndstrided_dispatch as dispatch;
pub use ndstrided_kernel as kernel;
pub use ndstrided_traits as traits;
pub use ndstrided_view as view;

// ============================================================================
// Element types and accessors
// ============================================================================
pub use ndstrided_traits::{
    Accessor, AccessorMut, DType, Element, IntoAccessor, IntoAccessorMut, Interleaved,
    InterleavedMut, OddInterleavedLength, Scalar, UnrecognizedDataType,
};

// ============================================================================
// Shapes, strides and views
// ============================================================================
pub use ndstrided_view::{
    bind2vind, broadcast_shapes, broadcast_strides, col_major_strides, for_each_multi_index,
    ind2sub, ind2sub_assign, iteration_order, min_max_view_buffer_index, nonsingleton_dimensions,
    numel, overlapping_dimension, row_major_strides, shape2strides, singleton_dimensions,
    strides2offset, strides2order, sub2ind, vind2bind, AccessorView, AccessorViewMut, ArrayView,
    ArrayViewMut, DynElement, DynView, DynViewMut, IndexMode, MultiIndex, NdArray, Order,
    StrideOrder,
};

// ============================================================================
// Kernels
// ============================================================================
pub use ndstrided_kernel::{
    accessor_binary_into, accessor_broadcast_binary_into, accessor_broadcast_quaternary_into,
    accessor_broadcast_ternary_into, accessor_broadcast_unary_into, accessor_nullary_into,
    accessor_quaternary_into, accessor_ternary_into, accessor_unary_into, apply_nary_into,
    binary_into, broadcast_binary_into, broadcast_quaternary_into, broadcast_quinary_into,
    broadcast_ternary_into, broadcast_unary_into, for_each_index, masked_unary_into,
    nullary_into, quaternary_into, quinary_into, ternary_into, unary_assign_into,
    unary_by_index_into, unary_into, MaybeSend, MaybeSendSync, MaybeSync, BLOCK_MEMORY_SIZE,
    CACHE_LINE_SIZE, MINTHREADLENGTH,
};

/// 1-D kernels with explicit length, stride and offset per array.
pub use ndstrided_kernel::strided;

// ============================================================================
// Dispatch
// ============================================================================
pub use ndstrided_dispatch::{
    binary_native, generic_kernel, generic_nary_into, nullary_native, ops, ternary_native,
    unary_native, DispatchTable, DispatchTableBuilder, Dispatcher, Kernel, KernelId, Op,
    Signature,
};

// ============================================================================
// Errors
// ============================================================================
pub use ndstrided_view::{Result, StridedError};
