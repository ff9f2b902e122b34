use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ols::linalg::{LinalgConfig, Matrix, RowOpStrategy, RowReducer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Strictly diagonally dominant, so every size has an inverse.
fn random_matrix(size: usize) -> Matrix {
    let mut rng = StdRng::seed_from_u64(0x5EED_F64 + size as u64);
    let mut m = Matrix::zero(size, size);
    for i in 0..size {
        for j in 0..size {
            let value = if i == j {
                size as f64 + rng.gen_range(1.0..2.0)
            } else {
                rng.gen_range(-1.0..1.0)
            };
            m.set(i, j, value).unwrap();
        }
    }
    m
}

fn benchmark_row_ops(c: &mut Criterion) {
    let sizes = [4_usize, 8, 16];
    let matrices: Vec<_> = sizes
        .iter()
        .map(|&size| (size, random_matrix(size)))
        .collect();
    let strategies = [
        ("elementary", RowOpStrategy::Elementary),
        ("direct", RowOpStrategy::Direct),
    ];

    let mut group = c.benchmark_group("inverse");
    for (size, matrix) in matrices.iter() {
        group.throughput(Throughput::Elements((*size * *size) as u64));
        for (label, strategy) in strategies {
            let reducer = RowReducer::new(LinalgConfig::default().with_row_ops(strategy));
            group.bench_with_input(BenchmarkId::new(label, size), matrix, |b, input| {
                b.iter(|| black_box(reducer.inverse(black_box(input)).unwrap()));
            });
        }
    }
    group.finish();

    let mut group = c.benchmark_group("gaussian_elimination");
    for (size, matrix) in matrices.iter() {
        group.throughput(Throughput::Elements((*size * *size) as u64));
        for (label, strategy) in strategies {
            let reducer = RowReducer::new(LinalgConfig::default().with_row_ops(strategy));
            group.bench_with_input(BenchmarkId::new(label, size), matrix, |b, input| {
                b.iter(|| black_box(reducer.gaussian_elimination(black_box(input)).unwrap()));
            });
        }
    }
    group.finish();
}

criterion_group!(row_ops, benchmark_row_ops);
criterion_main!(row_ops);
