//! Full-batch gradient-descent training loop.
//!
//! A run moves through three phases:
//!
//! 1. **Initializing**: hyperparameters and shapes are validated, then `X`
//!    and `Θ` are drawn from the seeded generator.
//! 2. **Iterating**: exactly `n_iterations` update steps are applied. The
//!    cost is reported before the first step and before every
//!    `report_every`-th step.
//! 3. **Done**: the final cost is evaluated and the factors are returned.
//!
//! There is no convergence test. The iteration count is the only
//! termination condition, apart from a callback asking to stop between
//! iterations.
//!
//! # Examples
//!
//! ```rust
//! use cofactor_core::prelude::*;
//! use cofactor_optim::MatrixFactorization;
//!
//! # fn main() -> cofactor_core::Result<()> {
//! let ratings = DMatrix::from_row_slice(2, 2, &[5.0, 0.0, 0.0, 3.0]);
//! let mask = ObservationMask::from_sentinel(&ratings, 0.0);
//!
//! let model = MatrixFactorization::new(
//!     FactorizationConfig::new()
//!         .with_factors(2)
//!         .with_learning_rate(0.01)
//!         .with_iterations(100)
//!         .with_seed(42),
//! )?;
//!
//! let result = model.fit(&ratings, &mask)?;
//! assert_eq!(result.factors.predict().shape(), (2, 2));
//! # Ok(())
//! # }
//! ```

use cofactor_core::{
    callback::{NoOpCallback, ProgressInfo, TrainingCallback},
    config::FactorizationConfig,
    error::{FactorizationError, Result},
    mask::ObservationMask,
    types::{DMatrix, Scalar},
};
use std::time::{Duration, Instant};

use crate::engine::{apply_gradients, MaskedSquaredError};
use crate::factors::FactorPair;
use crate::init::{make_rng, random_factors};
use crate::metrics::observed_rmse;

/// Phase of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    /// Validating inputs and drawing the initial factors
    Initializing,
    /// Applying update steps
    Iterating,
    /// Finished, factors ready to hand back
    Done,
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct FactorizationResult<T: Scalar> {
    /// The fitted item and user factors
    pub factors: FactorPair<T>,

    /// Cost of the returned factors
    pub final_cost: T,

    /// Number of update steps applied
    pub iterations: usize,

    /// Every reported `(iteration, cost)` pair, in order
    pub history: Vec<(usize, T)>,

    /// Wall-clock time of the run
    pub duration: Duration,

    /// True if a callback stopped the run before `n_iterations` steps
    pub stopped_early: bool,
}

impl<T: Scalar> FactorizationResult<T> {
    /// Dense predicted ratings `X * Theta^T`.
    pub fn predict(&self) -> DMatrix<T> {
        self.factors.predict()
    }

    /// RMSE of the fitted factors on the observed entries.
    pub fn observed_rmse(&self, ratings: &DMatrix<T>, mask: &ObservationMask) -> Result<Option<T>> {
        observed_rmse(&self.factors, ratings, mask)
    }

    /// Splits into `(X, Theta)`.
    pub fn into_factors(self) -> (DMatrix<T>, DMatrix<T>) {
        self.factors.into_parts()
    }
}

/// Mutable state of a run in progress.
#[derive(Debug)]
struct TrainingState<T: Scalar> {
    phase: TrainingPhase,
    factors: FactorPair<T>,
    iteration: usize,
    history: Vec<(usize, T)>,
    warned_non_finite: bool,
}

impl<T: Scalar> TrainingState<T> {
    fn initialize(n_items: usize, n_users: usize, config: &FactorizationConfig<T>) -> Self {
        let mut rng = make_rng(config.seed);
        let factors = random_factors(
            &mut rng,
            n_items,
            n_users,
            config.n_factors,
            config.init_scale,
        );
        Self {
            phase: TrainingPhase::Initializing,
            factors,
            iteration: 0,
            history: Vec::new(),
            warned_non_finite: false,
        }
    }

    fn transition(&mut self, next: TrainingPhase) {
        debug_assert!(
            matches!(
                (self.phase, next),
                (TrainingPhase::Initializing, TrainingPhase::Iterating)
                    | (TrainingPhase::Iterating, TrainingPhase::Done)
            ),
            "invalid phase transition {:?} -> {:?}",
            self.phase,
            next
        );
        tracing::trace!(from = ?self.phase, to = ?next, iteration = self.iteration, "phase transition");
        self.phase = next;
    }

    /// Applies the strict divergence check, or warns once when it is off.
    fn check_cost(&mut self, cost: T, config: &FactorizationConfig<T>) -> Result<()> {
        if cost.is_finite_value() {
            return Ok(());
        }
        if config.divergence_check {
            tracing::debug!(iteration = self.iteration, cost = cost.as_f64(), "training diverged");
            return Err(FactorizationError::diverged(self.iteration, cost.as_f64()));
        }
        if !self.warned_non_finite {
            tracing::warn!(
                iteration = self.iteration,
                cost = cost.as_f64(),
                "cost is not finite; consider a smaller learning rate or a positive regularization"
            );
            self.warned_non_finite = true;
        }
        Ok(())
    }
}

/// Fits `X` and `Θ` to the observed entries of `ratings`.
///
/// Validation happens before any factor is allocated: an invalid
/// configuration yields `InvalidHyperparameter`, a ratings/mask shape
/// mismatch yields `InvalidDimensions`.
pub fn train<T, C>(
    ratings: &DMatrix<T>,
    mask: &ObservationMask,
    config: &FactorizationConfig<T>,
    callback: &mut C,
) -> Result<FactorizationResult<T>>
where
    T: Scalar,
    C: TrainingCallback<T> + ?Sized,
{
    config.validate()?;
    let objective = MaskedSquaredError::new(ratings, mask, config.regularization)?;

    let (n_items, n_users) = ratings.shape();
    let span = tracing::debug_span!(
        "train",
        n_items,
        n_users,
        n_factors = config.n_factors,
        n_iterations = config.n_iterations
    );
    let _guard = span.enter();
    tracing::debug!(
        observed = mask.observed_count(),
        regularization = config.regularization.as_f64(),
        learning_rate = config.learning_rate.as_f64(),
        seed = ?config.seed,
        "starting training"
    );

    let start = Instant::now();
    let mut state = TrainingState::initialize(n_items, n_users, config);
    callback.on_training_start()?;
    state.transition(TrainingPhase::Iterating);

    let mut stopped_early = false;
    loop {
        let report = config.reports_at(state.iteration)
            && (state.iteration < config.n_iterations || state.iteration == 0);

        let pending_gradients = if report {
            let (cost, gradients) = objective.cost_and_gradients(&state.factors.item, &state.factors.user)?;
            state.check_cost(cost, config)?;
            state.history.push((state.iteration, cost));
            tracing::trace!(iteration = state.iteration, cost = cost.as_f64(), "progress");

            let info = ProgressInfo {
                iteration: state.iteration,
                cost,
                elapsed: start.elapsed(),
            };
            if !callback.on_progress(&info)? {
                stopped_early = state.iteration < config.n_iterations;
                break;
            }
            Some(gradients)
        } else if config.divergence_check && state.iteration < config.n_iterations {
            let (cost, gradients) = objective.cost_and_gradients(&state.factors.item, &state.factors.user)?;
            state.check_cost(cost, config)?;
            Some(gradients)
        } else {
            None
        };

        if state.iteration >= config.n_iterations {
            break;
        }

        let gradients = match pending_gradients {
            Some(gradients) => gradients,
            None => objective.gradients(&state.factors.item, &state.factors.user)?,
        };
        apply_gradients(&mut state.factors.item, &mut state.factors.user, &gradients, config.learning_rate);
        state.iteration += 1;
    }

    let final_cost = objective.cost(&state.factors.item, &state.factors.user)?;
    state.check_cost(final_cost, config)?;
    state.transition(TrainingPhase::Done);

    let duration = start.elapsed();
    callback.on_training_end(&ProgressInfo {
        iteration: state.iteration,
        cost: final_cost,
        elapsed: duration,
    })?;
    tracing::debug!(
        iterations = state.iteration,
        final_cost = final_cost.as_f64(),
        stopped_early,
        elapsed = ?duration,
        "training finished"
    );

    Ok(FactorizationResult {
        factors: state.factors,
        final_cost,
        iterations: state.iteration,
        history: state.history,
        duration,
        stopped_early,
    })
}

/// Gradient-descent matrix factorization model.
///
/// Holds a validated configuration; every `fit` starts from fresh factors
/// and keeps no state afterwards.
#[derive(Debug, Clone)]
pub struct MatrixFactorization<T: Scalar> {
    config: FactorizationConfig<T>,
}

impl<T: Scalar> MatrixFactorization<T> {
    /// Creates a model, rejecting invalid hyperparameters.
    pub fn new(config: FactorizationConfig<T>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the model configuration.
    pub fn config(&self) -> &FactorizationConfig<T> {
        &self.config
    }

    /// Returns the model name.
    pub fn name(&self) -> &str {
        "Gradient Descent Matrix Factorization"
    }

    /// Fits the model without observing progress.
    pub fn fit(&self, ratings: &DMatrix<T>, mask: &ObservationMask) -> Result<FactorizationResult<T>> {
        train(ratings, mask, &self.config, &mut NoOpCallback)
    }

    /// Fits the model, reporting progress to `callback`.
    pub fn fit_with_callback<C>(
        &self,
        ratings: &DMatrix<T>,
        mask: &ObservationMask,
        callback: &mut C,
    ) -> Result<FactorizationResult<T>>
    where
        C: TrainingCallback<T> + ?Sized,
    {
        train(ratings, mask, &self.config, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cofactor_core::callback::HistoryCallback;

    fn two_by_two() -> (DMatrix<f64>, ObservationMask) {
        let ratings = DMatrix::from_row_slice(2, 2, &[5.0, 0.0, 0.0, 3.0]);
        let mask = ObservationMask::from_sentinel(&ratings, 0.0);
        (ratings, mask)
    }

    #[test]
    fn test_model_creation() {
        let model = MatrixFactorization::<f64>::new(FactorizationConfig::new()).unwrap();
        assert_eq!(model.name(), "Gradient Descent Matrix Factorization");
        assert!(MatrixFactorization::<f64>::new(FactorizationConfig::new().with_factors(0)).is_err());
    }

    #[test]
    fn test_report_schedule() {
        let (ratings, mask) = two_by_two();
        let config = FactorizationConfig::new()
            .with_factors(1)
            .with_learning_rate(0.01)
            .with_iterations(25)
            .with_report_every(10)
            .with_seed(1);

        let mut history = HistoryCallback::new();
        let result = train(&ratings, &mask, &config, &mut history).unwrap();

        let iterations: Vec<usize> = history.history().iter().map(|&(i, _)| i).collect();
        assert_eq!(iterations, vec![0, 10, 20]);
        assert_eq!(result.history, history.history());
        assert_eq!(result.iterations, 25);
        assert_eq!(history.final_cost(), Some(result.final_cost));
        assert!(!result.stopped_early);
    }

    #[test]
    fn test_report_at_exact_multiple_is_before_step() {
        let (ratings, mask) = two_by_two();
        let config = FactorizationConfig::new()
            .with_factors(1)
            .with_iterations(20)
            .with_report_every(10)
            .with_seed(1);

        let result = train(&ratings, &mask, &config, &mut NoOpCallback).unwrap();
        let iterations: Vec<usize> = result.history.iter().map(|&(i, _)| i).collect();
        assert_eq!(iterations, vec![0, 10]);
    }

    #[test]
    fn test_zero_iterations_reports_initial_cost() {
        let (ratings, mask) = two_by_two();
        let config = FactorizationConfig::new().with_iterations(0).with_seed(3);

        let result = train(&ratings, &mask, &config, &mut NoOpCallback).unwrap();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.history.len(), 1);
        assert_eq!(result.history[0], (0, result.final_cost));
    }

    #[test]
    fn test_without_reporting() {
        let (ratings, mask) = two_by_two();
        let config = FactorizationConfig::new()
            .with_iterations(5)
            .without_reporting()
            .with_seed(3);

        let mut calls = 0;
        let mut callback = |_: usize, _: f64| calls += 1;
        let result = train(&ratings, &mask, &config, &mut callback).unwrap();
        assert_eq!(calls, 0);
        assert!(result.history.is_empty());
        assert_eq!(result.iterations, 5);
    }

    #[test]
    fn test_phase_transitions() {
        let config = FactorizationConfig::<f64>::new().with_seed(0);
        let mut state = TrainingState::initialize(2, 2, &config);
        assert_eq!(state.phase, TrainingPhase::Initializing);
        state.transition(TrainingPhase::Iterating);
        state.transition(TrainingPhase::Done);
        assert_eq!(state.phase, TrainingPhase::Done);
    }
}
