//! Hyperparameters for a training run.
//!
//! The configuration object carries everything a run needs, including the
//! random seed, so two runs with equal configurations and inputs produce
//! identical factors.
//!
//! # Examples
//!
//! ```rust
//! use cofactor_core::config::FactorizationConfig;
//!
//! let config = FactorizationConfig::<f64>::new()
//!     .with_factors(10)
//!     .with_learning_rate(0.001)
//!     .with_regularization(0.1)
//!     .with_iterations(500)
//!     .with_report_every(50)
//!     .with_seed(7);
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::{
    error::{FactorizationError, Result},
    types::Scalar,
};

/// Configuration for gradient-descent matrix factorization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactorizationConfig<T>
where
    T: Scalar,
{
    /// L2 regularization strength `reg`, must be `>= 0`
    pub regularization: T,

    /// Learning rate `alpha`, must be `> 0`
    pub learning_rate: T,

    /// Latent dimensionality `k`, must be at least 1
    pub n_factors: usize,

    /// Number of update steps to apply
    pub n_iterations: usize,

    /// Report the cost every this many steps (None = never)
    pub report_every: Option<usize>,

    /// Seed for factor initialization (None = seeded from entropy)
    pub seed: Option<u64>,

    /// Standard deviation of the initial factor entries
    pub init_scale: T,

    /// Abort with `Diverged` when a reported cost is not finite
    pub divergence_check: bool,
}

impl<T> Default for FactorizationConfig<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            regularization: T::zero(),
            learning_rate: <T as Scalar>::from_f64(0.001),
            n_factors: 10,
            n_iterations: 100,
            report_every: Some(10),
            seed: None,
            init_scale: T::one(),
            divergence_check: false,
        }
    }
}

impl<T> FactorizationConfig<T>
where
    T: Scalar,
{
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the regularization strength.
    pub fn with_regularization(mut self, regularization: T) -> Self {
        self.regularization = regularization;
        self
    }

    /// Sets the learning rate.
    pub fn with_learning_rate(mut self, learning_rate: T) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the number of latent factors.
    pub fn with_factors(mut self, n_factors: usize) -> Self {
        self.n_factors = n_factors;
        self
    }

    /// Sets the number of update steps.
    pub fn with_iterations(mut self, n_iterations: usize) -> Self {
        self.n_iterations = n_iterations;
        self
    }

    /// Reports the cost every `report_every` steps.
    pub fn with_report_every(mut self, report_every: usize) -> Self {
        self.report_every = Some(report_every);
        self
    }

    /// Disables progress reporting.
    pub fn without_reporting(mut self) -> Self {
        self.report_every = None;
        self
    }

    /// Fixes the random seed used for initialization.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the standard deviation of the initial factors.
    pub fn with_init_scale(mut self, init_scale: T) -> Self {
        self.init_scale = init_scale;
        self
    }

    /// Enables or disables the strict divergence check.
    pub fn with_divergence_check(mut self, enabled: bool) -> Self {
        self.divergence_check = enabled;
        self
    }

    /// Checks every hyperparameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        if self.n_factors == 0 {
            return Err(FactorizationError::invalid_hyperparameter(
                "n_factors",
                self.n_factors,
                "must be at least 1",
            ));
        }
        if !self.learning_rate.is_finite_value() || self.learning_rate <= T::zero() {
            return Err(FactorizationError::invalid_hyperparameter(
                "learning_rate",
                self.learning_rate,
                "must be a finite positive number",
            ));
        }
        if !self.regularization.is_finite_value() || self.regularization < T::zero() {
            return Err(FactorizationError::invalid_hyperparameter(
                "regularization",
                self.regularization,
                "must be a finite non-negative number",
            ));
        }
        if self.report_every == Some(0) {
            return Err(FactorizationError::invalid_hyperparameter(
                "report_every",
                0,
                "must be at least 1 when reporting is enabled",
            ));
        }
        if !self.init_scale.is_finite_value() || self.init_scale <= T::zero() {
            return Err(FactorizationError::invalid_hyperparameter(
                "init_scale",
                self.init_scale,
                "must be a finite positive number",
            ));
        }
        Ok(())
    }

    /// Whether the cost should be reported before step `iteration`.
    ///
    /// Iteration 0 is reported whenever reporting is enabled.
    pub fn reports_at(&self, iteration: usize) -> bool {
        match self.report_every {
            Some(every) if every > 0 => iteration % every == 0,
            _ => false,
        }
    }
}
