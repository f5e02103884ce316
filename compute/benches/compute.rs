//! Microbenchmarks of the heat equation solver

use compute::{solve, DormandPrince, HeatEquation};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use data::{parameters::Parameters, Grid};
use ndarray::Array1;
use std::hint::black_box;

/// Cost of one right-hand side evaluation for various grid sizes
fn rhs_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute::dudt");
    for size_pow2 in 4..=12 {
        let num_points = 2usize.pow(size_pow2);
        let xsize = 10.0;
        let grid = Grid::centered(xsize, xsize / num_points as f64, num_points);
        let heat = HeatEquation::on_grid(black_box(23.0), &grid);
        let u = Array1::from_iter(grid.coords().iter().map(|&x| (-x * x).exp()));

        group.throughput(Throughput::Elements(num_points as u64));
        group.bench_function(BenchmarkId::from_parameter(num_points), |b| {
            b.iter(|| heat.dudt(black_box(u.view())));
        });
    }
    group.finish();
}

/// Cost of a complete run with the adaptive integrator
fn solve_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute::solve");
    group.sample_size(10);
    for dx in [0.4, 0.2, 0.1] {
        let params = Parameters {
            dx,
            ..Default::default()
        };
        let integrator = DormandPrince::default();
        group.bench_function(BenchmarkId::from_parameter(dx), |b| {
            b.iter(|| solve(black_box(&params), &integrator));
        });
    }
    group.finish();
}

criterion_group!(benches, rhs_benchmark, solve_benchmark);
criterion_main!(benches);
