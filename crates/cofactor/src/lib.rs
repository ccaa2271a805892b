//! Cofactor - Low-rank matrix factorization for collaborative filtering.
//!
//! Given a partially observed ratings matrix `Y` of shape
//! `(n_items, n_users)` and a boolean mask `R` marking which entries are
//! genuine, cofactor learns item factors `X` and user factors `Θ` such that
//! `X Θᵗ` approximates `Y` on the observed entries. Training minimizes a
//! regularized squared error by full-batch gradient descent.
//!
//! This crate re-exports [`cofactor_core`] and [`cofactor_optim`].
//!
//! # Quick start
//!
//! ```rust
//! use cofactor::prelude::*;
//!
//! # fn main() -> cofactor::Result<()> {
//! let ratings = DMatrix::from_row_slice(
//!     3,
//!     2,
//!     &[5.0, 0.0,
//!       4.0, 1.0,
//!       0.0, 5.0],
//! );
//! let mask = ObservationMask::from_sentinel(&ratings, 0.0);
//!
//! let model = MatrixFactorization::new(
//!     FactorizationConfig::new()
//!         .with_factors(2)
//!         .with_learning_rate(0.01)
//!         .with_regularization(0.1)
//!         .with_iterations(500)
//!         .with_seed(7),
//! )?;
//!
//! let mut history = HistoryCallback::new();
//! let result = model.fit_with_callback(&ratings, &mask, &mut history)?;
//! assert!(result.final_cost <= history.costs()[0]);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `parallel` (default): build the residual with rayon on large problems
//! - `serde`: serialize [`FactorizationConfig`](cofactor_core::config::FactorizationConfig)

pub use cofactor_core;
pub use cofactor_optim;
pub use nalgebra;

pub use cofactor_core::{FactorizationError, Result};
pub use cofactor_optim::{
    compute_cost, compute_cost_and_gradients, compute_gradients, train, update_step,
    FactorizationResult, MatrixFactorization,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use cofactor_core::prelude::*;
    pub use cofactor_optim::{
        compute_cost, compute_cost_and_gradients, compute_gradients, observed_rmse, train,
        update_step, FactorPair, FactorizationResult, GradientChecker, MaskedSquaredError,
        MatrixFactorization, TrainingPhase,
    };
}
