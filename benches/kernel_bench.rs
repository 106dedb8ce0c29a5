use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndstrided::{
    binary_into, broadcast_binary_into, broadcast_quaternary_into, ops, unary_into, NdArray,
    Order,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::time::Duration;

fn random_matrix(rng: &mut StdRng, size: usize, order: Order) -> NdArray<f64> {
    NdArray::from_fn(&[size, size], order, |_| rng.sample(StandardNormal))
}

fn bench_copy_permuted(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_permuted");
    let mut rng = StdRng::seed_from_u64(0);
    for size in [100usize, 500, 1000] {
        group.throughput(Throughput::Elements((size * size) as u64));
        let a = random_matrix(&mut rng, size, Order::RowMajor);
        let a_t = a.view().permute(&[1, 0]).unwrap();

        group.bench_with_input(BenchmarkId::new("naive", size), &size, |b, _| {
            b.iter(|| {
                let mut out = vec![0.0; size * size];
                for i in 0..size {
                    for j in 0..size {
                        out[i * size + j] = a.data()[j * size + i];
                    }
                }
                out
            })
        });

        group.bench_with_input(BenchmarkId::new("strided", size), &size, |b, _| {
            b.iter(|| {
                let mut out = NdArray::<f64>::zeros(&[size, size], Order::RowMajor);
                if let Err(err) = unary_into(&mut out.view_mut(), &a_t, |x| x) {
                    panic!("unary_into failed: {err}");
                }
                out
            })
        });
    }
    group.finish();
}

fn bench_binary_mixed_strides(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary_mixed_strides");
    let mut rng = StdRng::seed_from_u64(1);
    for size in [100usize, 500, 1000] {
        group.throughput(Throughput::Elements((size * size) as u64));
        let a = random_matrix(&mut rng, size, Order::RowMajor);
        let b = random_matrix(&mut rng, size, Order::RowMajor);
        let a_t = a.view().permute(&[1, 0]).unwrap();

        group.bench_with_input(BenchmarkId::new("strided", size), &size, |bench, _| {
            bench.iter(|| {
                let mut out = NdArray::<f64>::zeros(&[size, size], Order::RowMajor);
                if let Err(err) = binary_into(&mut out.view_mut(), &a_t, &b.view(), |x, y| x + y)
                {
                    panic!("binary_into failed: {err}");
                }
                out
            })
        });
    }
    group.finish();
}

fn bench_broadcast_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast_row");
    let mut rng = StdRng::seed_from_u64(2);
    for size in [100usize, 1000] {
        group.throughput(Throughput::Elements((size * size) as u64));
        let a = random_matrix(&mut rng, size, Order::ColumnMajor);
        let row = NdArray::<f64>::from_fn(&[1, size], Order::RowMajor, |_| rng.gen());

        group.bench_with_input(BenchmarkId::new("strided", size), &size, |bench, _| {
            bench.iter(|| {
                let mut out = NdArray::<f64>::zeros(&[size, size], Order::ColumnMajor);
                if let Err(err) =
                    broadcast_binary_into(&mut out.view_mut(), &a.view(), &row.view(), |x, y| {
                        x * y
                    })
                {
                    panic!("broadcast_binary_into failed: {err}");
                }
                out
            })
        });
    }
    group.finish();
}

fn bench_quaternary_4d(c: &mut Criterion) {
    let mut group = c.benchmark_group("quaternary_4d");
    group.sample_size(10);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(10));

    let size = 24usize;
    let shape = [size; 4];
    let mut rng = StdRng::seed_from_u64(3);
    let a = NdArray::<f64>::from_fn(&shape, Order::RowMajor, |_| rng.sample(StandardNormal));
    let p1 = a.view().permute(&[0, 1, 2, 3]).unwrap();
    let p2 = a.view().permute(&[1, 2, 3, 0]).unwrap();
    let p3 = a.view().permute(&[2, 3, 0, 1]).unwrap();
    let p4 = a.view().permute(&[3, 0, 1, 2]).unwrap();
    group.throughput(Throughput::Elements(a.len() as u64));

    group.bench_function("strided_fused", |b| {
        b.iter(|| {
            let mut out = NdArray::<f64>::zeros(&shape, Order::RowMajor);
            if let Err(err) = broadcast_quaternary_into(
                &mut out.view_mut(),
                &p1,
                &p2,
                &p3,
                &p4,
                |w, x, y, z| w + x + y + z,
            ) {
                panic!("broadcast_quaternary_into failed: {err}");
            }
            out
        })
    });
    group.finish();
}

fn bench_dispatch_native_vs_generic(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_add");
    let size = 500usize;
    group.throughput(Throughput::Elements((size * size) as u64));
    let mut rng = StdRng::seed_from_u64(4);
    let a = random_matrix(&mut rng, size, Order::RowMajor);
    let b = random_matrix(&mut rng, size, Order::RowMajor);
    let dispatcher = match ops::Op::Add.dispatcher() {
        Ok(d) => d,
        Err(err) => panic!("building add table failed: {err}"),
    };

    group.bench_function("native", |bench| {
        bench.iter(|| {
            let mut out = NdArray::<f64>::zeros(&[size, size], Order::RowMajor);
            if let Err(err) =
                dispatcher.call(&[a.view().into(), b.view().into()], &mut out.view_mut().into())
            {
                panic!("dispatch failed: {err}");
            }
            out
        })
    });

    group.bench_function("generic", |bench| {
        let Some(fallback) = dispatcher.table().fallback() else {
            panic!("add has no fallback");
        };
        bench.iter(|| {
            let mut out = NdArray::<f64>::zeros(&[size, size], Order::RowMajor);
            if let Err(err) =
                fallback.run(&[a.view().into(), b.view().into()], &mut out.view_mut().into())
            {
                panic!("fallback failed: {err}");
            }
            out
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_copy_permuted,
    bench_binary_mixed_strides,
    bench_broadcast_row,
    bench_quaternary_4d,
    bench_dispatch_native_vs_generic
);
criterion_main!(benches);
