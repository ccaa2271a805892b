//! Core types for low-rank matrix factorization.
//!
//! This crate provides the foundations the factorization engine is built
//! on: the scalar trait and matrix aliases, the error taxonomy, the
//! observation mask that separates genuine ratings from placeholders, shape
//! validation, hyperparameter configuration and progress callbacks.
//!
//! # Key Concepts
//!
//! - **Ratings matrix `Y`**: dense `(n_items, n_users)` matrix, partly observed
//! - **Observation mask `R`**: boolean matrix of the same shape
//! - **Item factors `X`**: `(n_items, k)` latent vectors, one per row
//! - **User factors `Theta`**: `(n_users, k)` latent vectors, one per row
//!
//! # Modules
//!
//! - [`callback`]: Progress observers for training runs
//! - [`config`]: Hyperparameters for a training run
//! - [`error`]: Error types for factorization
//! - [`mask`]: Observation mask
//! - [`types`]: Scalar trait and matrix aliases
//! - [`validation`]: Shape checks

pub mod callback;
pub mod config;
pub mod error;
pub mod mask;
pub mod types;
pub mod validation;

// Re-export commonly used items at the crate root
pub use error::{FactorizationError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use cofactor_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{
        HistoryCallback, LoggingCallback, NoOpCallback, ProgressInfo, TrainingCallback,
    };
    pub use crate::config::FactorizationConfig;
    pub use crate::error::{FactorizationError, Result};
    pub use crate::mask::ObservationMask;
    pub use crate::types::{constants, DMatrix, DVector, Scalar, Shape};
    pub use crate::validation::{check_factors, check_ratings};
}
