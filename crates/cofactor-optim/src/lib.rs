//! Cofactor Optimization - Gradient-descent engine for low-rank matrix factorization.
//!
//! This crate fits item factors `X` and user factors `Θ` so that `X Θᵗ`
//! approximates the observed entries of a ratings matrix. Training is plain
//! full-batch gradient descent on a regularized masked squared error.
//!
//! # Components
//!
//! - **Engine**: cost, gradients and the update step, as free functions and
//!   as [`MaskedSquaredError`]
//! - **Trainer**: the fixed-iteration training loop and [`MatrixFactorization`]
//! - **Gradient check**: finite-difference verification of the gradients
//! - **Metrics**: RMSE over observed entries
//!
//! # Examples
//!
//! ```rust
//! use cofactor_core::prelude::*;
//! use cofactor_optim::{compute_cost, update_step};
//!
//! # fn main() -> cofactor_core::Result<()> {
//! let ratings = DMatrix::from_row_slice(2, 2, &[5.0, 0.0, 0.0, 3.0]);
//! let mask = ObservationMask::from_sentinel(&ratings, 0.0);
//!
//! let mut item = DMatrix::from_element(2, 1, 1.0);
//! let mut user = DMatrix::from_element(2, 1, 1.0);
//!
//! let before = compute_cost(&item, &user, &ratings, &mask, 0.0)?;
//! update_step(&mut item, &mut user, &ratings, &mask, 0.0, 0.01)?;
//! let after = compute_cost(&item, &user, &ratings, &mask, 0.0)?;
//! assert!(after < before);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod factors;
pub mod gradient_check;
pub mod init;
pub mod metrics;
mod residual;
pub mod trainer;

// Re-export the engine and trainer for convenience
pub use engine::{
    compute_cost, compute_cost_and_gradients, compute_gradients, update_step, Gradients,
    MaskedSquaredError,
};
pub use factors::FactorPair;
pub use gradient_check::{GradientCheckConfig, GradientCheckResult, GradientChecker};
pub use metrics::observed_rmse;
pub use trainer::{train, FactorizationResult, MatrixFactorization, TrainingPhase};

#[cfg(feature = "parallel")]
pub use residual::PARALLEL_THRESHOLD;
