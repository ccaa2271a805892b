//! Item and user factor matrices.

use cofactor_core::{
    error::{FactorizationError, Result},
    types::{DMatrix, Scalar},
};

/// The pair of latent factor matrices being optimized.
///
/// Row `i` of `item` is the latent vector of item `i`, row `j` of `user`
/// the latent vector of user `j`. Both have `k` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorPair<T: Scalar> {
    /// Item factors `X`, shape `(n_items, k)`
    pub item: DMatrix<T>,
    /// User factors `Theta`, shape `(n_users, k)`
    pub user: DMatrix<T>,
}

impl<T: Scalar> FactorPair<T> {
    /// Pairs two factor matrices, checking that they share `k`.
    pub fn new(item: DMatrix<T>, user: DMatrix<T>) -> Result<Self> {
        if item.ncols() != user.ncols() {
            return Err(FactorizationError::invalid_dimensions(
                format!("user factors with {} columns", item.ncols()),
                format!("user factors of shape {:?}", user.shape()),
            ));
        }
        Ok(Self { item, user })
    }

    /// All-zero factors. Gradient descent cannot leave this point on its own.
    pub fn zeros(n_items: usize, n_users: usize, n_factors: usize) -> Self {
        Self {
            item: DMatrix::zeros(n_items, n_factors),
            user: DMatrix::zeros(n_users, n_factors),
        }
    }

    /// Number of items (rows of `X`).
    pub fn n_items(&self) -> usize {
        self.item.nrows()
    }

    /// Number of users (rows of `Theta`).
    pub fn n_users(&self) -> usize {
        self.user.nrows()
    }

    /// Latent dimensionality `k`.
    pub fn n_factors(&self) -> usize {
        self.item.ncols()
    }

    /// Dense predicted ratings `X * Theta^T`, shape `(n_items, n_users)`.
    pub fn predict(&self) -> DMatrix<T> {
        &self.item * self.user.transpose()
    }

    /// Predicted rating of `item` by `user`, `None` when out of range.
    pub fn predict_entry(&self, item: usize, user: usize) -> Option<T> {
        if item >= self.n_items() || user >= self.n_users() {
            return None;
        }
        Some(self.item.row(item).dot(&self.user.row(user)))
    }

    /// Squared Frobenius norm of both factors, `|X|^2 + |Theta|^2`.
    pub fn squared_norm(&self) -> T {
        self.item.norm_squared() + self.user.norm_squared()
    }

    /// Whether every entry of both factors is finite.
    pub fn is_finite(&self) -> bool {
        self.item.iter().chain(self.user.iter()).all(|v| v.is_finite_value())
    }

    /// Splits into `(X, Theta)`.
    pub fn into_parts(self) -> (DMatrix<T>, DMatrix<T>) {
        (self.item, self.user)
    }
}
