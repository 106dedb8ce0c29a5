//! Element-wise kernels over strided views.
//!
//! `*_into` kernels require every input to have exactly the output shape;
//! `broadcast_*_into` kernels first broadcast each input to the output shape
//! (right-aligned, size-1 dimensions expanded with stride 0).
//!
//! All kernels validate before touching the output: a failing call writes
//! nothing. An output with a zero-size dimension is a no-op and `f` is never
//! called; a 0-d output calls `f` once.

use ndstrided_view::{ArrayView, ArrayViewMut};
use smallvec::SmallVec;

use crate::maybe_sync::{MaybeSendSync, MaybeSync};
use crate::plan::LoopPlan;
use crate::simd;
use crate::walk::{ensure_same_shape, ensure_writable_strides, flat_sequential};
use crate::Result;

#[cfg(feature = "parallel")]
use crate::threading::{par_walk, SendPtr};
#[cfg(feature = "parallel")]
use crate::MINTHREADLENGTH;

// ============================================================================
// Inner loops
//
// When every inner stride is 1 the run is handled as slices so the compiler
// can vectorize it; otherwise pointers are stepped by their strides.
// ============================================================================

#[inline(always)]
unsafe fn inner_loop_fill<D: Copy>(dp: *mut D, ds: isize, len: usize, f: &impl Fn() -> D) {
    if ds == 1 {
        let dst = std::slice::from_raw_parts_mut(dp, len);
        simd::vectorized(len, || {
            for d in dst.iter_mut() {
                *d = f();
            }
        });
    } else {
        let mut dp = dp;
        for _ in 0..len {
            *dp = f();
            dp = dp.wrapping_offset(ds);
        }
    }
}

macro_rules! nary_kernel {
    (
        $(#[$doc:meta])*
        fn $name:ident;
        $(#[$bdoc:meta])*
        fn $bname:ident;
        inner $inner:ident;
        $( $src:ident : $T:ident @ $k:tt ),+
    ) => {
        #[inline(always)]
        #[allow(clippy::too_many_arguments, clippy::needless_range_loop)]
        unsafe fn $inner<D: Copy, $($T: Copy),+>(
            dp: *mut D,
            ds: isize,
            $( $src: (*const $T, isize), )+
            len: usize,
            f: &impl Fn($($T),+) -> D,
        ) {
            if ds == 1 $(&& $src.1 == 1)+ {
                let dst = std::slice::from_raw_parts_mut(dp, len);
                $( let $src = std::slice::from_raw_parts($src.0, len); )+
                simd::vectorized(len, || {
                    for i in 0..len {
                        dst[i] = f($($src[i]),+);
                    }
                });
            } else {
                let mut dp = dp;
                $( let mut $src = $src; )+
                for _ in 0..len {
                    *dp = f($(*$src.0),+);
                    dp = dp.wrapping_offset(ds);
                    $( $src.0 = $src.0.wrapping_offset($src.1); )+
                }
            }
        }

        $(#[$doc])*
        pub fn $name<D, $($T),+>(
            dest: &mut ArrayViewMut<'_, D>,
            $( $src: &ArrayView<'_, $T>, )+
            f: impl Fn($($T),+) -> D + MaybeSync,
        ) -> Result<()>
        where
            D: Copy + MaybeSendSync,
            $( $T: Copy + MaybeSendSync, )+
        {
            $( ensure_same_shape(dest.shape(), $src.shape())?; )+
            ensure_writable_strides(dest.shape(), dest.strides())?;
            if dest.is_empty() {
                return Ok(());
            }

            let dst_ptr = dest.as_mut_ptr();
            let dst_dims = dest.shape();
            let strides_list = [dest.strides(), $($src.strides()),+];

            if flat_sequential(dst_dims, &strides_list) {
                let len = dest.len();
                unsafe { $inner(dst_ptr, 1, $(($src.ptr(), 1),)+ len, &f) };
                return Ok(());
            }

            let elem_size = [std::mem::size_of::<D>(), $(std::mem::size_of::<$T>()),+]
                .into_iter()
                .max()
                .unwrap_or(1);
            let plan = LoopPlan::new(dst_dims, &strides_list, elem_size);
            let origin = strides_list.map(|_| 0isize);

            #[cfg(feature = "parallel")]
            {
                if plan.len() > MINTHREADLENGTH {
                    let dst_send = SendPtr(dst_ptr);
                    $( let $src = SendPtr($src.ptr() as *mut $T); )+
                    return par_walk(
                        &plan,
                        &origin,
                        rayon::current_num_threads(),
                        &|offsets, len, strides| {
                            unsafe {
                                $inner(
                                    dst_send.get().offset(offsets[0]),
                                    strides[0],
                                    $( ($src.get_const().offset(offsets[$k]), strides[$k]), )+
                                    len,
                                    &f,
                                )
                            };
                            Ok(())
                        },
                    );
                }
            }

            plan.walk(&origin, |offsets, len, strides| {
                unsafe {
                    $inner(
                        dst_ptr.offset(offsets[0]),
                        strides[0],
                        $( ($src.ptr().offset(offsets[$k]), strides[$k]), )+
                        len,
                        &f,
                    )
                };
                Ok(())
            })
        }

        $(#[$bdoc])*
        pub fn $bname<D, $($T),+>(
            dest: &mut ArrayViewMut<'_, D>,
            $( $src: &ArrayView<'_, $T>, )+
            f: impl Fn($($T),+) -> D + MaybeSync,
        ) -> Result<()>
        where
            D: Copy + MaybeSendSync,
            $( $T: Copy + MaybeSendSync, )+
        {
            $( let $src = $src.broadcast_to(dest.shape())?; )+
            $name(dest, $(&$src),+, f)
        }
    };
}

/// Fill `dest` with values produced by `f`.
pub fn nullary_into<D>(dest: &mut ArrayViewMut<'_, D>, f: impl Fn() -> D + MaybeSync) -> Result<()>
where
    D: Copy + MaybeSendSync,
{
    ensure_writable_strides(dest.shape(), dest.strides())?;
    if dest.is_empty() {
        return Ok(());
    }

    let dst_ptr = dest.as_mut_ptr();
    let dst_dims = dest.shape();
    let strides_list = [dest.strides()];

    if flat_sequential(dst_dims, &strides_list) {
        unsafe { inner_loop_fill(dst_ptr, 1, dest.len(), &f) };
        return Ok(());
    }

    let plan = LoopPlan::new(dst_dims, &strides_list, std::mem::size_of::<D>());

    #[cfg(feature = "parallel")]
    {
        if plan.len() > MINTHREADLENGTH {
            let dst_send = SendPtr(dst_ptr);
            return par_walk(
                &plan,
                &[0],
                rayon::current_num_threads(),
                &|offsets, len, strides| {
                    let dp = dst_send.get();
                    unsafe { inner_loop_fill(dp.offset(offsets[0]), strides[0], len, &f) };
                    Ok(())
                },
            );
        }
    }

    plan.walk(&[0], |offsets, len, strides| {
        unsafe { inner_loop_fill(dst_ptr.offset(offsets[0]), strides[0], len, &f) };
        Ok(())
    })
}

nary_kernel! {
    /// `dest[i] = f(a[i])`.
    ///
    /// Source and destination may have different element types.
    fn unary_into;
    /// [`unary_into`] with `a` broadcast to the shape of `dest`.
    fn broadcast_unary_into;
    inner inner_loop_map1;
    a: A @ 1
}

nary_kernel! {
    /// `dest[i] = f(a[i], b[i])`.
    fn binary_into;
    /// [`binary_into`] with the inputs broadcast to the shape of `dest`.
    fn broadcast_binary_into;
    inner inner_loop_map2;
    a: A @ 1,
    b: B @ 2
}

nary_kernel! {
    /// `dest[i] = f(a[i], b[i], c[i])`.
    fn ternary_into;
    /// [`ternary_into`] with the inputs broadcast to the shape of `dest`.
    fn broadcast_ternary_into;
    inner inner_loop_map3;
    a: A @ 1,
    b: B @ 2,
    c: C @ 3
}

nary_kernel! {
    /// `dest[i] = f(a[i], b[i], c[i], e[i])`.
    fn quaternary_into;
    /// [`quaternary_into`] with the inputs broadcast to the shape of `dest`.
    fn broadcast_quaternary_into;
    inner inner_loop_map4;
    a: A @ 1,
    b: B @ 2,
    c: C @ 3,
    e: E @ 4
}

nary_kernel! {
    /// `dest[i] = f(a[i], b[i], c[i], e[i], g[i])`.
    fn quinary_into;
    /// [`quinary_into`] with the inputs broadcast to the shape of `dest`.
    fn broadcast_quinary_into;
    inner inner_loop_map5;
    a: A @ 1,
    b: B @ 2,
    c: C @ 3,
    e: E @ 4,
    g: G @ 5
}

// ============================================================================
// Arbitrary arity
// ============================================================================

/// Inner run for [`apply_nary_into`]; `offsets`/`strides` hold the output first.
#[inline(always)]
unsafe fn inner_loop_nary<D: Copy, T: Copy>(
    dp: *mut D,
    srcs: &[*const T],
    offsets: &[isize],
    strides: &[isize],
    len: usize,
    f: &impl Fn(&[T]) -> D,
) {
    let mut buf: SmallVec<[T; 8]> = SmallVec::with_capacity(srcs.len());
    for i in 0..len as isize {
        buf.clear();
        for (k, &p) in srcs.iter().enumerate() {
            buf.push(*p.offset(offsets[k + 1] + i * strides[k + 1]));
        }
        *dp.offset(offsets[0] + i * strides[0]) = f(&buf);
    }
}

/// `dest[i] = f(&[inputs[0][i], inputs[1][i], ...])` for any number of inputs.
///
/// Inputs are broadcast to the shape of `dest`. With no inputs `f` receives an
/// empty slice for every element.
pub fn apply_nary_into<D, T>(
    dest: &mut ArrayViewMut<'_, D>,
    inputs: &[ArrayView<'_, T>],
    f: impl Fn(&[T]) -> D + MaybeSync,
) -> Result<()>
where
    D: Copy + MaybeSendSync,
    T: Copy + MaybeSendSync,
{
    let inputs: Vec<ArrayView<'_, T>> = inputs
        .iter()
        .map(|v| v.broadcast_to(dest.shape()))
        .collect::<Result<_>>()?;
    ensure_writable_strides(dest.shape(), dest.strides())?;
    if dest.is_empty() {
        return Ok(());
    }

    let dst_ptr = dest.as_mut_ptr();
    let dst_dims = dest.shape();
    let mut strides_list: Vec<&[isize]> = Vec::with_capacity(inputs.len() + 1);
    strides_list.push(dest.strides());
    strides_list.extend(inputs.iter().map(|v| v.strides()));
    let srcs: SmallVec<[*const T; 8]> = inputs.iter().map(|v| v.ptr()).collect();

    if flat_sequential(dst_dims, &strides_list) {
        let zeros = vec![0isize; strides_list.len()];
        let ones = vec![1isize; strides_list.len()];
        unsafe { inner_loop_nary(dst_ptr, &srcs, &zeros, &ones, dest.len(), &f) };
        return Ok(());
    }

    let elem_size = std::mem::size_of::<D>().max(std::mem::size_of::<T>());
    let plan = LoopPlan::new(dst_dims, &strides_list, elem_size);
    let origin = vec![0isize; strides_list.len()];

    #[cfg(feature = "parallel")]
    {
        if plan.len() > MINTHREADLENGTH {
            let dst_send = SendPtr(dst_ptr);
            let src_send: SmallVec<[SendPtr<T>; 8]> =
                srcs.iter().map(|&p| SendPtr(p as *mut T)).collect();
            return par_walk(
                &plan,
                &origin,
                rayon::current_num_threads(),
                &|offsets, len, strides| {
                    let srcs: SmallVec<[*const T; 8]> =
                        src_send.iter().map(|p| p.get_const()).collect();
                    unsafe { inner_loop_nary(dst_send.get(), &srcs, offsets, strides, len, &f) };
                    Ok(())
                },
            );
        }
    }

    plan.walk(&origin, |offsets, len, strides| {
        unsafe { inner_loop_nary(dst_ptr, &srcs, offsets, strides, len, &f) };
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndstrided_view::{NdArray, Order, StridedError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_tensor(rows: usize, cols: usize) -> NdArray<f64> {
        NdArray::from_fn(&[rows, cols], Order::RowMajor, |idx| {
            (idx[0] * cols + idx[1]) as f64
        })
    }

    #[test]
    fn test_unary_into_transposed() {
        let a = make_tensor(8, 5);
        let a_t = a.view().permute(&[1, 0]).unwrap();

        let mut out = NdArray::<f64>::zeros(&[5, 8], Order::RowMajor);
        unary_into(&mut out.view_mut(), &a_t, |x| x * 2.0).unwrap();

        for i in 0..5 {
            for j in 0..8 {
                let expected = a.get(&[j, i]).unwrap() * 2.0;
                assert_relative_eq!(out.get(&[i, j]).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_unary_into_type_change() {
        let a = NdArray::from_fn(&[3, 4], Order::ColumnMajor, |i| (i[0] + i[1]) as i32);
        let mut out = NdArray::<f64>::zeros(&[3, 4], Order::RowMajor);
        unary_into(&mut out.view_mut(), &a.view(), |x| x as f64 + 0.5).unwrap();
        assert_relative_eq!(out.get(&[2, 3]).unwrap(), 5.5);
        assert_relative_eq!(out.get(&[0, 1]).unwrap(), 1.5);
    }

    #[test]
    fn test_binary_into_mixed_strides() {
        let a = make_tensor(6, 4);
        let b = make_tensor(4, 6);
        let a_t = a.view().permute(&[1, 0]).unwrap();

        let mut out = NdArray::<f64>::zeros(&[4, 6], Order::ColumnMajor);
        binary_into(&mut out.view_mut(), &a_t, &b.view(), |x, y| x - y).unwrap();

        for i in 0..4 {
            for j in 0..6 {
                let expected = a.get(&[j, i]).unwrap() - b.get(&[i, j]).unwrap();
                assert_relative_eq!(out.get(&[i, j]).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_binary_into_negative_strides() {
        let a = make_tensor(3, 4);
        let flipped = a.view().flip(0).unwrap().flip(1).unwrap();
        let mut out = NdArray::<f64>::zeros(&[3, 4], Order::RowMajor);
        binary_into(&mut out.view_mut(), &flipped, &a.view(), |x, y| x + y).unwrap();
        // a[i,j] + a[2-i, 3-j] = 11 everywhere.
        assert!(out.iter().all(|&x| x == 11.0));
    }

    #[test]
    fn test_ternary_into() {
        let a = make_tensor(5, 7);
        let b = make_tensor(5, 7);
        let c = make_tensor(7, 5);
        let c_t = c.view().permute(&[1, 0]).unwrap();
        let mut out = NdArray::<f64>::zeros(&[5, 7], Order::RowMajor);
        ternary_into(&mut out.view_mut(), &a.view(), &b.view(), &c_t, |x, y, z| {
            x * y + z
        })
        .unwrap();
        let x = a.get(&[4, 6]).unwrap();
        assert_relative_eq!(out.get(&[4, 6]).unwrap(), x * x + c.get(&[6, 4]).unwrap());
    }

    #[test]
    fn test_broadcast_quaternary_sums_ones() {
        let a = NdArray::filled(&[1, 2], 1.0f64, Order::RowMajor);
        let b = NdArray::filled(&[2, 1], 1.0f64, Order::RowMajor);
        let c = NdArray::filled(&[1, 1], 1.0f64, Order::RowMajor);
        let e = NdArray::filled(&[2, 2], 1.0f64, Order::RowMajor);
        let mut out = NdArray::<f64>::zeros(&[2, 2], Order::RowMajor);
        broadcast_quaternary_into(
            &mut out.view_mut(),
            &a.view(),
            &b.view(),
            &c.view(),
            &e.view(),
            |w, x, y, z| w + x + y + z,
        )
        .unwrap();
        assert!(out.iter().all(|&v| v == 4.0));
    }

    #[test]
    fn test_quinary_into() {
        let arrays: Vec<NdArray<i64>> = (0..5)
            .map(|k| NdArray::from_fn(&[2, 3, 4], Order::RowMajor, |i| (i[2] as i64) << k))
            .collect();
        let mut out = NdArray::<i64>::zeros(&[2, 3, 4], Order::ColumnMajor);
        quinary_into(
            &mut out.view_mut(),
            &arrays[0].view(),
            &arrays[1].view(),
            &arrays[2].view(),
            &arrays[3].view(),
            &arrays[4].view(),
            |a, b, c, d, e| a + b + c + d + e,
        )
        .unwrap();
        assert_eq!(out.get(&[1, 2, 3]).unwrap(), 3 * 31);
    }

    #[test]
    fn test_broadcast_binary_adds_ones() {
        let a = NdArray::filled(&[1, 1, 2], 1.0f64, Order::RowMajor);
        let b = NdArray::filled(&[2, 1, 1], 1.0f64, Order::RowMajor);
        let mut out = NdArray::<f64>::zeros(&[2, 2, 2], Order::RowMajor);
        broadcast_binary_into(&mut out.view_mut(), &a.view(), &b.view(), |x, y| x + y).unwrap();
        assert!(out.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_broadcast_row_read_repeatedly() {
        let row = NdArray::from_vec(vec![1.0, 2.0, 3.0], &[1, 3], Order::RowMajor).unwrap();
        let mut out = NdArray::<f64>::zeros(&[4, 3], Order::RowMajor);
        broadcast_unary_into(&mut out.view_mut(), &row.view(), |x| x).unwrap();
        assert_eq!(out.data(), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_broadcast_incompatible() {
        let a = NdArray::<f64>::zeros(&[2, 3], Order::RowMajor);
        let mut out = NdArray::<f64>::zeros(&[2, 4], Order::RowMajor);
        let err = broadcast_unary_into(&mut out.view_mut(), &a.view(), |x| x).unwrap_err();
        assert!(matches!(err, StridedError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_shape_mismatch_writes_nothing() {
        let a = NdArray::filled(&[2, 3], 1.0f64, Order::RowMajor);
        let b = NdArray::filled(&[3, 2], 1.0f64, Order::RowMajor);
        let mut out = NdArray::<f64>::filled(&[2, 3], -1.0, Order::RowMajor);
        assert!(binary_into(&mut out.view_mut(), &a.view(), &b.view(), |x, y| x + y).is_err());
        assert!(out.iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_zero_stride_output_rejected() {
        let a = NdArray::filled(&[3], 1.0f64, Order::RowMajor);
        let mut buf = vec![0.0f64; 1];
        let mut out = ArrayViewMut::new(&mut buf, &[3], &[0], 0, Order::RowMajor).unwrap();
        assert!(matches!(
            unary_into(&mut out, &a.view(), |x| x),
            Err(StridedError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_overlapping_output_rejected() {
        let a = NdArray::filled(&[2, 2], 1.0f64, Order::RowMajor);
        let b = NdArray::filled(&[2, 2], 2.0f64, Order::RowMajor);
        let mut buf = vec![0.0f64; 3];
        let mut out = ArrayViewMut::new(&mut buf, &[2, 2], &[1, 1], 0, Order::RowMajor).unwrap();
        assert!(matches!(
            binary_into(&mut out, &a.view(), &b.view(), |x, y| x + y),
            Err(StridedError::InvalidArgument(_))
        ));
        assert_eq!(buf, vec![0.0; 3]);
    }

    #[test]
    fn test_empty_output_never_calls() {
        let calls = AtomicUsize::new(0);
        let a = NdArray::<f64>::zeros(&[3, 0], Order::RowMajor);
        let mut out = NdArray::<f64>::zeros(&[3, 0], Order::RowMajor);
        unary_into(&mut out.view_mut(), &a.view(), |x| {
            calls.fetch_add(1, Ordering::Relaxed);
            x
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_zero_dim_calls_once() {
        let calls = AtomicUsize::new(0);
        let mut buf = [0.0f64, 0.0];
        let mut out = ArrayViewMut::new(&mut buf, &[], &[], 1, Order::RowMajor).unwrap();
        nullary_into(&mut out, || {
            calls.fetch_add(1, Ordering::Relaxed);
            7.0
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(buf, [0.0, 7.0]);
    }

    #[test]
    fn test_nullary_into_strided() {
        let mut buf = vec![0i32; 12];
        let mut out = ArrayViewMut::new(&mut buf, &[3, 2], &[-4, 2], 8, Order::RowMajor).unwrap();
        nullary_into(&mut out, || 1).unwrap();
        assert_eq!(buf, vec![1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_large_transposed_uses_blocked_path() {
        let n = 300;
        let a = make_tensor(n, n);
        let a_t = a.view().permute(&[1, 0]).unwrap();
        let mut out = NdArray::<f64>::zeros(&[n, n], Order::RowMajor);
        unary_into(&mut out.view_mut(), &a_t, |x| x + 1.0).unwrap();
        for &(i, j) in &[(0, 0), (1, 299), (157, 3), (299, 298)] {
            assert_relative_eq!(
                out.get(&[i, j]).unwrap(),
                a.get(&[j, i]).unwrap() + 1.0
            );
        }
    }

    #[test]
    fn test_apply_nary_into() {
        let a = NdArray::filled(&[1, 3], 1.0f64, Order::RowMajor);
        let b = NdArray::from_fn(&[2, 3], Order::ColumnMajor, |i| i[0] as f64);
        let c = NdArray::filled(&[3], 10.0f64, Order::RowMajor);
        let mut out = NdArray::<f64>::zeros(&[2, 3], Order::RowMajor);
        apply_nary_into(&mut out.view_mut(), &[a.view(), b.view(), c.view()], |xs| {
            xs.iter().sum()
        })
        .unwrap();
        assert_eq!(out.data(), &[11.0, 11.0, 11.0, 12.0, 12.0, 12.0]);

        let mut out = NdArray::<usize>::zeros(&[2], Order::RowMajor);
        apply_nary_into::<usize, f64>(&mut out.view_mut(), &[], |xs| xs.len() + 1).unwrap();
        assert_eq!(out.data(), &[1, 1]);
    }
}
