//! Element-wise kernels over accessor-backed views.
//!
//! Same iteration as [`nary`](crate::nary), but elements are read and written
//! through [`Accessor::get`] / [`AccessorMut::set`] so the storage can be any
//! accessor (interleaved complex buffers, plain slices, ...). The accessor type
//! is fixed per call, so the storage path is chosen by monomorphization.
//!
//! `accessor_*_into` kernels require every input to have the output shape;
//! `accessor_broadcast_*_into` kernels broadcast the inputs to it first.

use ndstrided_traits::{Accessor, AccessorMut};
use ndstrided_view::{broadcast_strides, AccessorView, AccessorViewMut};

use crate::walk::{ensure_same_shape, ensure_writable_strides, for_each_run};
use crate::Result;

#[inline(always)]
fn at(origin: usize, offset: isize, i: isize, stride: isize) -> usize {
    (origin as isize + offset + i * stride) as usize
}

/// Fill `dest` with values produced by `f`.
pub fn accessor_nullary_into<M>(
    dest: &mut AccessorViewMut<M>,
    f: impl Fn() -> M::Item,
) -> Result<()>
where
    M: AccessorMut,
{
    ensure_writable_strides(dest.shape(), dest.strides())?;

    let shape = dest.shape().to_vec();
    let dst_strides = dest.strides().to_vec();
    let dst_origin = dest.offset();
    let da = dest.accessor_mut();

    for_each_run(
        &shape,
        &[dst_strides.as_slice()],
        std::mem::size_of::<M::Item>(),
        |offsets, len, strides| {
            for i in 0..len as isize {
                da.set(at(dst_origin, offsets[0], i, strides[0]), f());
            }
            Ok(())
        },
    )
}

// Each input is lowered to `(accessor, origin, strides)` before the walk.
macro_rules! accessor_walk {
    ($dest:ident, $f:ident, $M:ident; $( $src:ident : $T:ident @ $k:tt ),+) => {{
        ensure_writable_strides($dest.shape(), $dest.strides())?;

        let shape = $dest.shape().to_vec();
        let dst_strides = $dest.strides().to_vec();
        let dst_origin = $dest.offset();
        let elem_size = [
            std::mem::size_of::<$M::Item>(),
            $( std::mem::size_of::<$T::Item>(), )+
        ]
        .into_iter()
        .max()
        .unwrap_or(1);
        let da = $dest.accessor_mut();

        for_each_run(
            &shape,
            &[dst_strides.as_slice(), $( $src.2.as_slice() ),+],
            elem_size,
            |offsets, len, strides| {
                for i in 0..len as isize {
                    let v = $f($( $src.0.get(at($src.1, offsets[$k], i, strides[$k])) ),+);
                    da.set(at(dst_origin, offsets[0], i, strides[0]), v);
                }
                Ok(())
            },
        )
    }};
}

macro_rules! accessor_kernel {
    (
        $(#[$doc:meta])*
        fn $name:ident;
        $(#[$bdoc:meta])*
        fn $bname:ident;
        $( $src:ident : $T:ident @ $k:tt ),+
    ) => {
        $(#[$doc])*
        pub fn $name<M, $($T),+>(
            dest: &mut AccessorViewMut<M>,
            $( $src: &AccessorView<$T>, )+
            f: impl Fn($($T::Item),+) -> M::Item,
        ) -> Result<()>
        where
            M: AccessorMut,
            $( $T: Accessor, )+
        {
            $( ensure_same_shape(dest.shape(), $src.shape())?; )+
            $( let $src = ($src.accessor(), $src.offset(), $src.strides().to_vec()); )+
            accessor_walk!(dest, f, M; $( $src : $T @ $k ),+)
        }

        $(#[$bdoc])*
        pub fn $bname<M, $($T),+>(
            dest: &mut AccessorViewMut<M>,
            $( $src: &AccessorView<$T>, )+
            f: impl Fn($($T::Item),+) -> M::Item,
        ) -> Result<()>
        where
            M: AccessorMut,
            $( $T: Accessor, )+
        {
            $(
                let $src = (
                    $src.accessor(),
                    $src.offset(),
                    broadcast_strides(dest.shape(), $src.shape(), $src.strides())?,
                );
            )+
            accessor_walk!(dest, f, M; $( $src : $T @ $k ),+)
        }
    };
}

accessor_kernel! {
    /// `dest[i] = f(src[i])` over accessor storage.
    fn accessor_unary_into;
    /// [`accessor_unary_into`] with `src` broadcast to the shape of `dest`.
    fn accessor_broadcast_unary_into;
    src: S @ 1
}

accessor_kernel! {
    /// `dest[i] = f(a[i], b[i])` over accessor storage.
    fn accessor_binary_into;
    /// [`accessor_binary_into`] with the inputs broadcast to the shape of `dest`.
    fn accessor_broadcast_binary_into;
    a: A @ 1,
    b: B @ 2
}

accessor_kernel! {
    /// `dest[i] = f(a[i], b[i], c[i])` over accessor storage.
    fn accessor_ternary_into;
    /// [`accessor_ternary_into`] with the inputs broadcast to the shape of `dest`.
    fn accessor_broadcast_ternary_into;
    a: A @ 1,
    b: B @ 2,
    c: C @ 3
}

accessor_kernel! {
    /// `dest[i] = f(a[i], b[i], c[i], e[i])` over accessor storage.
    fn accessor_quaternary_into;
    /// [`accessor_quaternary_into`] with the inputs broadcast to the shape of `dest`.
    fn accessor_broadcast_quaternary_into;
    a: A @ 1,
    b: B @ 2,
    c: C @ 3,
    e: E @ 4
}
