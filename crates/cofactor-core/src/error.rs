//! Error types for matrix factorization.
//!
//! Shape and hyperparameter problems are detected eagerly, before any
//! arithmetic, and surfaced to the caller. Numeric divergence is only an
//! error when the caller opts into the strict check.

use thiserror::Error;

/// Errors that can occur while evaluating or training a factorization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactorizationError {
    /// Shape mismatch among the ratings, mask and factor matrices.
    ///
    /// No partial computation happens when this is returned.
    #[error("Invalid dimensions: expected {expected}, got {actual}")]
    InvalidDimensions {
        /// Expected shape, described in words
        expected: String,
        /// Actual shape, described in words
        actual: String,
    },

    /// A hyperparameter is outside its valid range.
    #[error("Invalid hyperparameter `{parameter}` = {value}: {reason}")]
    InvalidHyperparameter {
        /// Name of the offending parameter
        parameter: String,
        /// Value that was rejected
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The cost became infinite or NaN while the divergence check was enabled.
    #[error("Training diverged at iteration {iteration}: cost = {cost}")]
    Diverged {
        /// Number of update steps applied when the non-finite cost was seen
        iteration: usize,
        /// The offending cost value
        cost: f64,
    },

    /// A training callback reported a failure.
    #[error("Callback failed: {reason}")]
    CallbackFailed {
        /// Description provided by the callback
        reason: String,
    },
}

impl FactorizationError {
    /// Create an InvalidDimensions error.
    pub fn invalid_dimensions<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::InvalidDimensions {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an InvalidHyperparameter error.
    pub fn invalid_hyperparameter<S1, S2, S3>(parameter: S1, value: S2, reason: S3) -> Self
    where
        S1: Into<String>,
        S2: std::fmt::Display,
        S3: Into<String>,
    {
        Self::InvalidHyperparameter {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a Diverged error.
    pub fn diverged(iteration: usize, cost: f64) -> Self {
        Self::Diverged { iteration, cost }
    }

    /// Create a CallbackFailed error with a custom reason.
    pub fn callback_failed<S: Into<String>>(reason: S) -> Self {
        Self::CallbackFailed {
            reason: reason.into(),
        }
    }
}

/// Result type alias for factorization operations.
pub type Result<T> = std::result::Result<T, FactorizationError>;
