//! Random factor initialization.
//!
//! Factors start from independent draws of `scale · N(0, 1)`. Distinct
//! values break the symmetry between latent dimensions: with equal
//! columns every gradient column is equal too, and the factors never
//! separate.

use cofactor_core::types::{DMatrix, Scalar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::factors::FactorPair;

/// Creates the random generator for a run.
///
/// A fixed seed makes the whole run reproducible.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Fills a `(n_rows, n_cols)` matrix with `scale · N(0, 1)` draws, column by column.
pub fn random_matrix<T: Scalar, R: Rng>(
    rng: &mut R,
    n_rows: usize,
    n_cols: usize,
    scale: T,
) -> DMatrix<T> {
    DMatrix::from_fn(n_rows, n_cols, |_, _| {
        let draw: f64 = rng.sample(StandardNormal);
        <T as Scalar>::from_f64(draw) * scale
    })
}

/// Draws item factors, then user factors, from the same generator.
pub fn random_factors<T: Scalar, R: Rng>(
    rng: &mut R,
    n_items: usize,
    n_users: usize,
    n_factors: usize,
    scale: T,
) -> FactorPair<T> {
    let item = random_matrix(rng, n_items, n_factors, scale);
    let user = random_matrix(rng, n_users, n_factors, scale);
    FactorPair { item, user }
}
