//! Shape validation for the factorization inputs.
//!
//! Every engine entry point calls into this module before touching any
//! numbers, so a mismatch never leaves partially computed or partially
//! updated matrices behind.

use crate::{
    error::{FactorizationError, Result},
    mask::ObservationMask,
    types::{DMatrix, Scalar},
};

/// Checks that the ratings matrix and the mask have identical shapes.
pub fn check_ratings<T: Scalar>(ratings: &DMatrix<T>, mask: &ObservationMask) -> Result<()> {
    if ratings.shape() != mask.shape() {
        return Err(FactorizationError::invalid_dimensions(
            format!("mask of shape {:?} (same as ratings)", ratings.shape()),
            format!("mask of shape {:?}", mask.shape()),
        ));
    }
    Ok(())
}

/// Checks the full set of shapes used by cost and gradient evaluation.
///
/// With `Y` of shape `(n_items, n_users)`, `X` must be `(n_items, k)` and
/// `Theta` must be `(n_users, k)` for the same `k`.
pub fn check_factors<T: Scalar>(
    item_factors: &DMatrix<T>,
    user_factors: &DMatrix<T>,
    ratings: &DMatrix<T>,
    mask: &ObservationMask,
) -> Result<()> {
    check_ratings(ratings, mask)?;

    let (n_items, n_users) = ratings.shape();
    if item_factors.nrows() != n_items {
        return Err(FactorizationError::invalid_dimensions(
            format!("item factors with {n_items} rows"),
            format!("item factors of shape {:?}", item_factors.shape()),
        ));
    }
    if user_factors.nrows() != n_users {
        return Err(FactorizationError::invalid_dimensions(
            format!("user factors with {n_users} rows"),
            format!("user factors of shape {:?}", user_factors.shape()),
        ));
    }
    if item_factors.ncols() != user_factors.ncols() {
        return Err(FactorizationError::invalid_dimensions(
            format!(
                "user factors with {} columns (same as item factors)",
                item_factors.ncols()
            ),
            format!("user factors of shape {:?}", user_factors.shape()),
        ));
    }
    Ok(())
}
