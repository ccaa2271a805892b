//! Masked residual `E = (X * Theta^T - Y) ∘ R`.
//!
//! The residual is built one user column at a time: column `j` is the
//! matrix-vector product `X * theta_j` minus `Y[:, j]`, with unobserved
//! entries overwritten by zero. The same per-column routine backs both the
//! sequential and the rayon path, so the two produce identical bits.

use cofactor_core::{
    mask::ObservationMask,
    types::{DMatrix, DVector, Scalar},
};

/// Problems with at least this many `n_items * n_users * k` multiply-adds
/// are split across threads.
#[cfg(feature = "parallel")]
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Computes the masked residual. Shapes must already be validated.
pub(crate) fn masked_residual<T: Scalar>(
    item_factors: &DMatrix<T>,
    user_factors: &DMatrix<T>,
    ratings: &DMatrix<T>,
    mask: &ObservationMask,
) -> DMatrix<T> {
    let (n_items, n_users) = ratings.shape();
    if n_users == 0 {
        return DMatrix::zeros(n_items, 0);
    }

    let column = |user: usize| residual_column(item_factors, user_factors, ratings, mask, user);
    let columns = collect_columns(n_users, n_items * n_users * item_factors.ncols(), column);

    DMatrix::from_columns(&columns)
}

#[cfg(feature = "parallel")]
fn collect_columns<T, F>(n_users: usize, work: usize, column: F) -> Vec<DVector<T>>
where
    T: Scalar,
    F: Fn(usize) -> DVector<T> + Sync + Send,
{
    use rayon::prelude::*;

    if work >= PARALLEL_THRESHOLD {
        (0..n_users).into_par_iter().map(column).collect()
    } else {
        (0..n_users).map(column).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn collect_columns<T, F>(n_users: usize, _work: usize, column: F) -> Vec<DVector<T>>
where
    T: Scalar,
    F: Fn(usize) -> DVector<T>,
{
    (0..n_users).map(column).collect()
}

fn residual_column<T: Scalar>(
    item_factors: &DMatrix<T>,
    user_factors: &DMatrix<T>,
    ratings: &DMatrix<T>,
    mask: &ObservationMask,
    user: usize,
) -> DVector<T> {
    let user_vector = user_factors.row(user).transpose();
    let mut column = item_factors * user_vector;

    for (item, entry) in column.iter_mut().enumerate() {
        if mask.is_observed(item, user) {
            *entry -= ratings[(item, user)];
        } else {
            *entry = T::zero();
        }
    }
    column
}
