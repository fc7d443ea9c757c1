//! Benchmarks for the damped Gauss-Newton fitter.
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gnfit::{
    Config, Model, fit_with_config,
    models::{Exponential, Gaussian, Polynomial},
    solver::step::solve_step,
};

/// `n` evenly spaced points in `[lo, hi]`.
fn grid(n: usize, lo: f64, hi: f64) -> Vec<f64> {
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}

fn fit_exponential(c: &mut Criterion) {
    let x = grid(50, 0.0, 5.0);
    let y = Exponential.evaluate(&[3.0, 0.4], &x);
    c.bench_function("fit_exponential", |b| {
        b.iter(|| {
            let _actual = black_box(
                fit_with_config(&x, &y, &Exponential, &[1.0, 0.1], Config::default()).unwrap(),
            );
        });
    });
}

fn fit_gaussian(c: &mut Criterion) {
    let x = grid(50, -3.0, 3.0);
    let y = Gaussian.evaluate(&[2.0, 0.5, 0.8], &x);
    c.bench_function("fit_gaussian", |b| {
        b.iter(|| {
            let _actual = black_box(
                fit_with_config(&x, &y, &Gaussian, &[1.0, 0.0, 1.0], Config::default()).unwrap(),
            );
        });
    });
}

/// How the fit scales with the number of measurements.
fn fit_polynomial_by_size(c: &mut Criterion) {
    let model = Polynomial { degree: 3 };
    let mut group = c.benchmark_group("fit_polynomial");
    for size in [10, 100, 1_000, 10_000] {
        let x = grid(size, -1.0, 1.0);
        let y = model.evaluate(&[1.0, -2.0, 0.5, 3.0], &x);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let _actual = black_box(
                    fit_with_config(&x, &y, &model, &[0.0; 4], Config::default()).unwrap(),
                );
            });
        });
    }
    group.finish();
}

/// Just the linear least-squares step, without the loop around it.
fn step_only(c: &mut Criterion) {
    let x = grid(1_000, 0.0, 5.0);
    let jacobian = Exponential.jacobian(&[3.0, 0.4], &x);
    let residual = vec![0.1; x.len()];
    c.bench_function("solve_step", |b| {
        b.iter(|| {
            let _actual = black_box(solve_step(&jacobian, &residual, 1.0).unwrap());
        });
    });
}

criterion_group!(
    benches,
    fit_exponential,
    fit_gaussian,
    fit_polynomial_by_size,
    step_only,
);
criterion_main!(benches);
