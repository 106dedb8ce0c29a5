//! Typed kernels behind a runtime-typed interface.
//!
//! Each constructor monomorphizes one of the ndstrided-kernel element-wise
//! kernels for concrete element types and wraps it as a [`Kernel`]. The wrapped
//! kernel downcasts its arguments and fails with `DTypeMismatch` if it is
//! handed views of other types, which only happens when it is called directly
//! instead of through a [`Dispatcher`](crate::Dispatcher).

use ndstrided_view::{DynElement, Result, StridedError};

use crate::table::Kernel;

fn check_arity(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(StridedError::InvalidArgument(format!(
            "kernel takes {expected} inputs, got {got}"
        )));
    }
    Ok(())
}

/// Kernel writing `f()` into every output element.
pub fn nullary_native<D: DynElement>(name: &str, f: fn() -> D) -> Kernel {
    Kernel::new(name, move |inputs, output| {
        check_arity(0, inputs.len())?;
        ndstrided_kernel::nullary_into(output.downcast_mut::<D>()?, f)
    })
}

/// Kernel applying `f` to one input broadcast against the output.
pub fn unary_native<A, D>(name: &str, f: fn(A) -> D) -> Kernel
where
    A: DynElement,
    D: DynElement,
{
    Kernel::new(name, move |inputs, output| {
        check_arity(1, inputs.len())?;
        let a = inputs[0].downcast::<A>()?;
        ndstrided_kernel::broadcast_unary_into(output.downcast_mut::<D>()?, a, f)
    })
}

/// Kernel applying `f` to two inputs broadcast against the output.
pub fn binary_native<A, B, D>(name: &str, f: fn(A, B) -> D) -> Kernel
where
    A: DynElement,
    B: DynElement,
    D: DynElement,
{
    Kernel::new(name, move |inputs, output| {
        check_arity(2, inputs.len())?;
        let a = inputs[0].downcast::<A>()?;
        let b = inputs[1].downcast::<B>()?;
        ndstrided_kernel::broadcast_binary_into(output.downcast_mut::<D>()?, a, b, f)
    })
}

/// Kernel applying `f` to three inputs broadcast against the output.
pub fn ternary_native<A, B, C, D>(name: &str, f: fn(A, B, C) -> D) -> Kernel
where
    A: DynElement,
    B: DynElement,
    C: DynElement,
    D: DynElement,
{
    Kernel::new(name, move |inputs, output| {
        check_arity(3, inputs.len())?;
        let a = inputs[0].downcast::<A>()?;
        let b = inputs[1].downcast::<B>()?;
        let c = inputs[2].downcast::<C>()?;
        ndstrided_kernel::broadcast_ternary_into(output.downcast_mut::<D>()?, a, b, c, f)
    })
}
