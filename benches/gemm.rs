use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use packgemm::{dgemm, MatMut, MatRef};

// Compute GFlop/s by flop / s = 2 M N K / time

fn bench_dgemm(c: &mut Criterion) {
    let mut group = c.benchmark_group("dgemm");

    for &size in &[16usize, 64, 127, 256] {
        let a = vec![1.0f64; size * size];
        let b = vec![2.0f64; size * size];
        let mut cm = vec![0.0f64; size * size];

        group.bench_with_input(BenchmarkId::new("row_major", size), &size, |bencher, &s| {
            bencher.iter(|| unsafe {
                let av = MatRef::from_raw_parts(black_box(a.as_ptr()), s, s, s as isize, 1);
                let bv = MatRef::from_raw_parts(black_box(b.as_ptr()), s, s, s as isize, 1);
                let cv = MatMut::from_raw_parts(cm.as_mut_ptr(), s, s, s as isize, 1);
                dgemm(s, s, s, av, bv, cv);
            })
        });

        group.bench_with_input(BenchmarkId::new("col_major", size), &size, |bencher, &s| {
            bencher.iter(|| unsafe {
                let av = MatRef::from_raw_parts(black_box(a.as_ptr()), s, s, 1, s as isize);
                let bv = MatRef::from_raw_parts(black_box(b.as_ptr()), s, s, 1, s as isize);
                let cv = MatMut::from_raw_parts(cm.as_mut_ptr(), s, s, 1, s as isize);
                dgemm(s, s, s, av, bv, cv);
            })
        });
    }

    group.finish();
}

fn custom_criterion() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(2))
        .measurement_time(std::time::Duration::from_secs(5))
}

criterion_group! {
    name = benches;
    config = custom_criterion();
    targets = bench_dgemm
}
criterion_main!(benches);
