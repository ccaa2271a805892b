//! Progress observers for training runs.
//!
//! The training loop never prints. It hands `(iteration, cost)` pairs to a
//! [`TrainingCallback`], which may log them, store them, or ask the loop to
//! stop between iterations.

use crate::error::Result;
use crate::types::Scalar;
use std::time::Duration;

/// Information passed to callbacks at each reporting point.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressInfo<T: Scalar> {
    /// Number of update steps applied so far
    pub iteration: usize,

    /// Cost of the current factors
    pub cost: T,

    /// Elapsed time since training started
    pub elapsed: Duration,
}

/// Trait for training observers.
pub trait TrainingCallback<T: Scalar> {
    /// Called once the factors are initialized, before the first report.
    fn on_training_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called at iteration 0 and every `report_every` iterations.
    ///
    /// Returns `true` to continue training, `false` to stop before the next step.
    fn on_progress(&mut self, info: &ProgressInfo<T>) -> Result<bool>;

    /// Called when training finishes, with the final cost.
    fn on_training_end(&mut self, info: &ProgressInfo<T>) -> Result<()> {
        let _ = info;
        Ok(())
    }
}

/// Closures receiving `(iteration, cost)` are callbacks that never stop training.
impl<T, F> TrainingCallback<T> for F
where
    T: Scalar,
    F: FnMut(usize, T),
{
    fn on_progress(&mut self, info: &ProgressInfo<T>) -> Result<bool> {
        self(info.iteration, info.cost);
        Ok(true)
    }
}

/// A callback that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCallback;

impl<T: Scalar> TrainingCallback<T> for NoOpCallback {
    fn on_progress(&mut self, _info: &ProgressInfo<T>) -> Result<bool> {
        Ok(true)
    }
}

/// A callback that emits each report as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingCallback;

impl<T: Scalar> TrainingCallback<T> for LoggingCallback {
    fn on_training_start(&mut self) -> Result<()> {
        tracing::info!("starting factorization");
        Ok(())
    }

    fn on_progress(&mut self, info: &ProgressInfo<T>) -> Result<bool> {
        tracing::info!(
            iteration = info.iteration,
            cost = info.cost.as_f64(),
            elapsed = ?info.elapsed,
            "progress"
        );
        Ok(true)
    }

    fn on_training_end(&mut self, info: &ProgressInfo<T>) -> Result<()> {
        tracing::info!(
            iterations = info.iteration,
            cost = info.cost.as_f64(),
            elapsed = ?info.elapsed,
            "factorization complete"
        );
        Ok(())
    }
}

/// A callback that records every reported pair.
#[derive(Debug, Clone)]
pub struct HistoryCallback<T: Scalar> {
    history: Vec<(usize, T)>,
    final_cost: Option<T>,
}

impl<T: Scalar> Default for HistoryCallback<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> HistoryCallback<T> {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            final_cost: None,
        }
    }

    /// Reported `(iteration, cost)` pairs in order.
    pub fn history(&self) -> &[(usize, T)] {
        &self.history
    }

    /// Reported costs in order.
    pub fn costs(&self) -> Vec<T> {
        self.history.iter().map(|&(_, cost)| cost).collect()
    }

    /// Cost passed to `on_training_end`, if training finished.
    pub fn final_cost(&self) -> Option<T> {
        self.final_cost
    }
}

impl<T: Scalar> TrainingCallback<T> for HistoryCallback<T> {
    fn on_training_start(&mut self) -> Result<()> {
        self.history.clear();
        self.final_cost = None;
        Ok(())
    }

    fn on_progress(&mut self, info: &ProgressInfo<T>) -> Result<bool> {
        self.history.push((info.iteration, info.cost));
        Ok(true)
    }

    fn on_training_end(&mut self, info: &ProgressInfo<T>) -> Result<()> {
        self.final_cost = Some(info.cost);
        Ok(())
    }
}
