use approx::assert_relative_eq;
use ndstrided_kernel::{
    apply_nary_into, binary_into, broadcast_binary_into, broadcast_ternary_into, for_each_index,
    nullary_into, quaternary_into, unary_assign_into, unary_into, StridedError,
};
use ndstrided_view::{numel, ArrayView, NdArray, Order};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn random_array(rng: &mut StdRng, shape: &[usize]) -> NdArray<f64> {
    let order = if rng.gen_bool(0.5) {
        Order::RowMajor
    } else {
        Order::ColumnMajor
    };
    NdArray::from_fn(shape, order, |_| rng.gen_range(-1.0..1.0))
}

/// A view of `a` permuted by `perm` with every axis in `flips` reversed.
fn scrambled<'a>(a: &'a NdArray<f64>, perm: &[usize], flips: &[usize]) -> ArrayView<'a, f64> {
    let mut v = a.view().permute(perm).unwrap();
    for &axis in flips {
        v = v.flip(axis).unwrap();
    }
    v
}

fn index_in_source(idx: &[usize], shape: &[usize], perm: &[usize], flips: &[usize]) -> Vec<usize> {
    let mut view_idx = idx.to_vec();
    for &axis in flips {
        view_idx[axis] = shape[axis] - 1 - view_idx[axis];
    }
    let mut src = vec![0; idx.len()];
    for (d, &p) in perm.iter().enumerate() {
        src[p] = view_idx[d];
    }
    src
}

#[test]
fn test_unary_random_layouts() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..40 {
        let rank = rng.gen_range(1..=6);
        let src_shape: Vec<usize> = (0..rank).map(|_| rng.gen_range(1..=5)).collect();
        let a = random_array(&mut rng, &src_shape);

        let mut perm: Vec<usize> = (0..rank).collect();
        perm.shuffle(&mut rng);
        let flips: Vec<usize> = (0..rank).filter(|_| rng.gen_bool(0.3)).collect();
        let view = scrambled(&a, &perm, &flips);
        let shape = view.shape().to_vec();

        let mut out = NdArray::<f64>::zeros(&shape, Order::ColumnMajor);
        unary_into(&mut out.view_mut(), &view, |x| 3.0 * x - 1.0).unwrap();

        for_each_index(&out.view(), |idx, _| {
            let src = index_in_source(idx, &shape, &perm, &flips);
            assert_relative_eq!(
                out.get(idx).unwrap(),
                3.0 * a.get(&src).unwrap() - 1.0,
                epsilon = 1e-12
            );
        });
    }
}

#[test]
fn test_binary_random_layouts() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..30 {
        let rank = rng.gen_range(2..=5);
        let shape: Vec<usize> = (0..rank).map(|_| rng.gen_range(1..=6)).collect();
        let a = random_array(&mut rng, &shape);
        let b = random_array(&mut rng, &shape);

        let mut perm: Vec<usize> = (0..rank).collect();
        perm.shuffle(&mut rng);
        let permuted_shape: Vec<usize> = perm.iter().map(|&p| shape[p]).collect();
        let a_view = a.view().permute(&perm).unwrap();
        let b_view = b.view().permute(&perm).unwrap();

        let mut out = NdArray::<f64>::zeros(&permuted_shape, Order::RowMajor);
        binary_into(&mut out.view_mut(), &a_view, &b_view, |x, y| x * y).unwrap();

        for_each_index(&out.view(), |idx, _| {
            let src = index_in_source(idx, &permuted_shape, &perm, &[]);
            let expected = a.get(&src).unwrap() * b.get(&src).unwrap();
            assert_relative_eq!(out.get(idx).unwrap(), expected, epsilon = 1e-12);
        });
    }
}

#[test]
fn test_callback_count_matches_numel() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    for shape in [vec![], vec![0], vec![3, 1, 2], vec![2, 0, 4], vec![2, 3, 2, 2, 3]] {
        let calls = AtomicUsize::new(0);
        let mut out = NdArray::<f64>::zeros(&shape, Order::RowMajor);
        nullary_into(&mut out.view_mut(), || {
            calls.fetch_add(1, Ordering::Relaxed);
            1.0
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), numel(&shape));
    }
}

#[test]
fn test_broadcast_row_four_times() {
    let row = NdArray::from_vec(vec![1.0, 2.0, 3.0], &[1, 3], Order::RowMajor).unwrap();
    let zeros = NdArray::<f64>::zeros(&[4, 3], Order::RowMajor);
    let mut out = NdArray::<f64>::zeros(&[4, 3], Order::ColumnMajor);
    broadcast_binary_into(&mut out.view_mut(), &row.view(), &zeros.view(), |x, y| x + y).unwrap();
    for i in 0..4 {
        for j in 0..3 {
            assert_eq!(out.get(&[i, j]).unwrap(), (j + 1) as f64);
        }
    }
}

#[test]
fn test_broadcast_ternary_scalar_like() {
    let a = NdArray::filled(&[], 2.0f64, Order::RowMajor);
    let b = NdArray::from_fn(&[3, 1], Order::RowMajor, |i| i[0] as f64);
    let c = NdArray::from_fn(&[4], Order::RowMajor, |i| i[0] as f64 * 10.0);
    let mut out = NdArray::<f64>::zeros(&[3, 4], Order::RowMajor);
    broadcast_ternary_into(&mut out.view_mut(), &a.view(), &b.view(), &c.view(), |x, y, z| {
        x * y + z
    })
    .unwrap();
    assert_eq!(out.get(&[2, 3]).unwrap(), 34.0);
    assert_eq!(out.get(&[1, 0]).unwrap(), 2.0);
}

#[test]
fn test_broadcast_shape_mismatch_names_dimension() {
    let a = NdArray::<f64>::zeros(&[2, 3], Order::RowMajor);
    let b = NdArray::<f64>::zeros(&[2, 4], Order::RowMajor);
    let mut out = NdArray::<f64>::zeros(&[2, 4], Order::RowMajor);
    match broadcast_binary_into(&mut out.view_mut(), &a.view(), &b.view(), |x, y| x + y) {
        Err(StridedError::ShapeMismatch { dim, .. }) => assert_eq!(dim, 1),
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
}

#[test]
fn test_complex_quaternary() {
    let a = NdArray::from_fn(&[3, 3], Order::RowMajor, |i| {
        Complex64::new(i[0] as f64, i[1] as f64)
    });
    let one = NdArray::filled(&[3, 3], Complex64::new(1.0, 0.0), Order::ColumnMajor);
    let i_unit = NdArray::filled(&[3, 3], Complex64::new(0.0, 1.0), Order::RowMajor);
    let mut out = NdArray::filled(&[3, 3], Complex64::new(0.0, 0.0), Order::RowMajor);
    let a_t = a.view().permute(&[1, 0]).unwrap();
    quaternary_into(
        &mut out.view_mut(),
        &a.view(),
        &a_t,
        &one.view(),
        &i_unit.view(),
        |p, q, r, s| p * q + r * s,
    )
    .unwrap();
    let p = Complex64::new(1.0, 2.0);
    let q = Complex64::new(2.0, 1.0);
    let expected = p * q + Complex64::new(0.0, 1.0);
    let got = out.get(&[1, 2]).unwrap();
    assert_relative_eq!(got.re, expected.re);
    assert_relative_eq!(got.im, expected.im);
}

#[test]
fn test_apply_nary_matches_binary() {
    let mut rng = StdRng::seed_from_u64(7);
    let a = random_array(&mut rng, &[5, 7]);
    let b = random_array(&mut rng, &[5, 7]);

    let mut expected = NdArray::<f64>::zeros(&[5, 7], Order::RowMajor);
    binary_into(&mut expected.view_mut(), &a.view(), &b.view(), |x, y| x - y).unwrap();

    let mut got = NdArray::<f64>::zeros(&[5, 7], Order::RowMajor);
    apply_nary_into(&mut got.view_mut(), &[a.view(), b.view()], |xs| xs[0] - xs[1]).unwrap();

    assert_eq!(got.data(), expected.data());
}

#[test]
fn test_assign_scatters_view_order() {
    let a = NdArray::from_fn(&[2, 3], Order::ColumnMajor, |i| (i[0] * 3 + i[1]) as f64);
    let mut out = vec![0.0; 13];
    unary_assign_into(&a.view(), &mut out, 1, 2, Order::RowMajor, |x| x + 1.0).unwrap();
    let written: Vec<f64> = out.iter().skip(1).step_by(2).copied().collect();
    assert_eq!(written, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert!(out.iter().step_by(2).all(|&x| x == 0.0));
}
