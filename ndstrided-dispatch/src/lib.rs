//! Runtime dtype dispatch over the ndstrided kernels.
//!
//! A [`Dispatcher`] maps the runtime dtypes of its argument views to one of a
//! list of typed kernels:
//!
//! - entries are `(Signature, Kernel)` pairs matched exactly and in order
//! - the first match runs; without a match the fallback runs
//! - without a fallback the call fails with `NoMatchingKernel`
//!
//! Accelerated entries are monomorphized ndstrided-kernel loops ([`native`]);
//! the fallback evaluates through [`Scalar`](ndstrided_view::Scalar) values
//! ([`fallback`]) and accepts any dtype combination. Both paths produce the
//! same bits for the fixed-width numeric types.
//!
//! # Example
//!
//! ```
//! use ndstrided_dispatch::{binary_native, dispatch, generic_kernel, KernelId, Signature};
//! use ndstrided_view::{DynViewMut, NdArray, Order};
//!
//! let sub = dispatch(
//!     "sub",
//!     2,
//!     vec![(
//!         Signature::from_chars("dd_d").unwrap(),
//!         binary_native::<f64, f64, f64>("sub_f64", |x, y| x - y),
//!     )],
//!     generic_kernel("sub_generic", |xs| xs[0] - xs[1]),
//! )
//! .unwrap();
//!
//! let a = NdArray::<f64>::from_vec(vec![5.0, 7.0], &[2], Order::RowMajor).unwrap();
//! let b = NdArray::<f64>::from_vec(vec![1.0, 2.0], &[2], Order::RowMajor).unwrap();
//! let mut out = NdArray::<f64>::zeros(&[2], Order::RowMajor);
//! let mut dst: DynViewMut<'_> = out.view_mut().into();
//! let id = sub.call(&[a.view().into(), b.view().into()], &mut dst).unwrap();
//! assert_eq!(id, KernelId::Entry(0));
//! drop(dst);
//! assert_eq!(out.data(), &[4.0, 5.0]);
//! ```

pub mod fallback;
pub mod native;
pub mod ops;
pub mod signature;
pub mod table;

pub use fallback::{generic_kernel, generic_nary_into};
pub use native::{binary_native, nullary_native, ternary_native, unary_native};
pub use ops::Op;
pub use signature::Signature;
pub use table::{dispatch, DispatchTable, DispatchTableBuilder, Dispatcher, Kernel, KernelFn, KernelId};

pub use ndstrided_view::{Result, StridedError};
