//! Benchmarks for the factorization engine
//!
//! Run with: cargo bench

use cofactor_core::{config::FactorizationConfig, mask::ObservationMask, types::DMatrix};
use cofactor_optim::{compute_cost_and_gradients, update_step, MatrixFactorization};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthetic ratings in 1..=5 with roughly `density` of the entries observed.
fn synthetic_problem(
    n_items: usize,
    n_users: usize,
    density: f64,
) -> (DMatrix<f64>, ObservationMask) {
    let mut rng = StdRng::seed_from_u64(17);
    let ratings = DMatrix::from_fn(n_items, n_users, |_, _| {
        if rng.gen_bool(density) {
            rng.gen_range(1..=5) as f64
        } else {
            0.0
        }
    });
    let mask = ObservationMask::from_sentinel(&ratings, 0.0);
    (ratings, mask)
}

fn benchmark_cost_and_gradients(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_and_gradients");

    for &(n_items, n_users) in &[(100, 50), (500, 300), (1_682, 943)] {
        let (ratings, mask) = synthetic_problem(n_items, n_users, 0.06);
        let item = DMatrix::from_element(n_items, 10, 0.1);
        let user = DMatrix::from_element(n_users, 10, 0.1);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_items}x{n_users}")),
            &(n_items, n_users),
            |b, _| {
                b.iter(|| {
                    compute_cost_and_gradients(
                        black_box(&item),
                        black_box(&user),
                        &ratings,
                        &mask,
                        1.5,
                    )
                })
            },
        );
    }

    group.finish();
}

fn benchmark_update_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_step");

    for &k in &[5, 10, 50] {
        let (ratings, mask) = synthetic_problem(500, 300, 0.06);
        let mut item = DMatrix::from_element(500, k, 0.1);
        let mut user = DMatrix::from_element(300, k, 0.1);

        group.bench_with_input(BenchmarkId::new("factors", k), &k, |b, _| {
            b.iter(|| update_step(&mut item, &mut user, &ratings, &mask, 1.5, 1e-4))
        });
    }

    group.finish();
}

fn benchmark_training(c: &mut Criterion) {
    let (ratings, mask) = synthetic_problem(200, 100, 0.1);
    let model = MatrixFactorization::new(
        FactorizationConfig::new()
            .with_factors(10)
            .with_learning_rate(1e-3)
            .with_regularization(1.0)
            .with_iterations(50)
            .without_reporting()
            .with_init_scale(0.1)
            .with_seed(1),
    )
    .unwrap();

    c.bench_function("train_200x100_k10_50_iterations", |b| {
        b.iter(|| model.fit(black_box(&ratings), &mask))
    });
}

criterion_group!(
    benches,
    benchmark_cost_and_gradients,
    benchmark_update_step,
    benchmark_training
);
criterion_main!(benches);
