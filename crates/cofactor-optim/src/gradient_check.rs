//! Finite-difference verification of the analytic gradients.
//!
//! Each entry of `X` and `Θ` is perturbed by `±h` and the central
//! difference `(J(+h) − J(−h)) / 2h` is compared with the matching entry of
//! the analytic gradient.

use cofactor_core::{
    error::Result,
    types::{constants, Scalar},
};
use num_traits::Float;

use crate::engine::MaskedSquaredError;
use crate::factors::FactorPair;

/// Configuration for gradient checking.
#[derive(Debug, Clone)]
pub struct GradientCheckConfig<T> {
    /// Step size for central differences
    pub step_size: T,
    /// Maximum accepted error, relative to `max(1, |analytic|)`
    pub tolerance: T,
}

impl<T: Scalar> Default for GradientCheckConfig<T> {
    fn default() -> Self {
        Self {
            step_size: constants::finite_difference_step(),
            tolerance: constants::gradient_check_tolerance(),
        }
    }
}

/// Results from gradient checking.
#[derive(Debug, Clone)]
pub struct GradientCheckResult<T> {
    /// Largest absolute difference between analytic and numerical entries
    pub max_absolute_error: T,
    /// Largest difference scaled by `max(1, |analytic|)`
    pub max_relative_error: T,
    /// Number of entries compared
    pub entries_checked: usize,
    /// Whether every entry is within tolerance
    pub passed: bool,
}

/// Compares analytic gradients with central finite differences.
#[derive(Debug, Clone)]
pub struct GradientChecker<T> {
    config: GradientCheckConfig<T>,
}

impl<T: Scalar> Default for GradientChecker<T> {
    fn default() -> Self {
        Self::new(GradientCheckConfig::default())
    }
}

impl<T: Scalar> GradientChecker<T> {
    /// Creates a checker with the given configuration.
    pub fn new(config: GradientCheckConfig<T>) -> Self {
        Self { config }
    }

    /// Checks both gradients of `objective` at `factors`.
    pub fn check(
        &self,
        objective: &MaskedSquaredError<'_, T>,
        factors: &FactorPair<T>,
    ) -> Result<GradientCheckResult<T>> {
        let analytic = objective.gradients(&factors.item, &factors.user)?;
        let mut probe = factors.clone();
        let mut result = GradientCheckResult {
            max_absolute_error: T::zero(),
            max_relative_error: T::zero(),
            entries_checked: 0,
            passed: true,
        };

        for index in 0..probe.item.len() {
            let numerical = self.central_difference(objective, &mut probe, Side::Item, index)?;
            self.record(&mut result, analytic.item[index], numerical);
        }
        for index in 0..probe.user.len() {
            let numerical = self.central_difference(objective, &mut probe, Side::User, index)?;
            self.record(&mut result, analytic.user[index], numerical);
        }

        Ok(result)
    }

    fn central_difference(
        &self,
        objective: &MaskedSquaredError<'_, T>,
        probe: &mut FactorPair<T>,
        side: Side,
        index: usize,
    ) -> Result<T> {
        let h = self.config.step_size;
        let original = side.entry(probe, index);

        *side.entry_mut(probe, index) = original + h;
        let cost_plus = objective.cost(&probe.item, &probe.user)?;
        *side.entry_mut(probe, index) = original - h;
        let cost_minus = objective.cost(&probe.item, &probe.user)?;
        *side.entry_mut(probe, index) = original;

        Ok((cost_plus - cost_minus) / (h + h))
    }

    fn record(&self, result: &mut GradientCheckResult<T>, analytic: T, numerical: T) {
        let absolute = <T as Float>::abs(analytic - numerical);
        let relative = absolute / <T as Float>::max(T::one(), <T as Float>::abs(analytic));

        result.entries_checked += 1;
        result.max_absolute_error = <T as Float>::max(result.max_absolute_error, absolute);
        result.max_relative_error = <T as Float>::max(result.max_relative_error, relative);
        if <T as Float>::is_nan(relative) || relative > self.config.tolerance {
            result.passed = false;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Item,
    User,
}

impl Side {
    fn entry<T: Scalar>(self, factors: &FactorPair<T>, index: usize) -> T {
        match self {
            Self::Item => factors.item[index],
            Self::User => factors.user[index],
        }
    }

    fn entry_mut<T: Scalar>(self, factors: &mut FactorPair<T>, index: usize) -> &mut T {
        match self {
            Self::Item => &mut factors.item[index],
            Self::User => &mut factors.user[index],
        }
    }
}
