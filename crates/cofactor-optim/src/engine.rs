//! Cost, gradients and the gradient-descent update step.
//!
//! # Mathematical Foundation
//!
//! With the masked residual `E = (X Θᵗ − Y) ∘ R`, the objective is
//!
//! ```text
//! J(X, Θ) = ½ Σᵢⱼ Eᵢⱼ² + (reg/2)(‖X‖_F² + ‖Θ‖_F²)
//! ```
//!
//! and its exact partial derivatives are
//!
//! ```text
//! ∂J/∂X = E Θ + reg X
//! ∂J/∂Θ = Eᵗ X + reg Θ
//! ```
//!
//! The squared-error term is an elementwise square-then-sum of `E`, which is
//! `O(n_items · n_users)` once `E` is formed.
//!
//! # Update rule
//!
//! One step moves both factors along the gradient evaluated at the same
//! snapshot:
//!
//! ```text
//! X' = X − α ∂J/∂X(X, Θ)
//! Θ' = Θ − α ∂J/∂Θ(X, Θ)
//! ```
//!
//! `Θ'` is never computed from `X'`.

use cofactor_core::{
    error::Result,
    mask::ObservationMask,
    types::{constants, DMatrix, Scalar},
    validation::{check_factors, check_ratings},
};

use crate::factors::FactorPair;
use crate::residual::masked_residual;

/// Gradients of the cost with respect to both factor matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients<T: Scalar> {
    /// `∂J/∂X`, shape `(n_items, k)`
    pub item: DMatrix<T>,
    /// `∂J/∂Θ`, shape `(n_users, k)`
    pub user: DMatrix<T>,
}

/// The regularized masked squared-error objective bound to one dataset.
///
/// Borrowing the ratings and mask once lets the training loop skip
/// re-validating them at every step; only the factor shapes are checked.
#[derive(Debug, Clone, Copy)]
pub struct MaskedSquaredError<'a, T: Scalar> {
    ratings: &'a DMatrix<T>,
    mask: &'a ObservationMask,
    regularization: T,
}

impl<'a, T: Scalar> MaskedSquaredError<'a, T> {
    /// Binds the objective to a ratings matrix and its mask.
    pub fn new(ratings: &'a DMatrix<T>, mask: &'a ObservationMask, regularization: T) -> Result<Self> {
        check_ratings(ratings, mask)?;
        Ok(Self {
            ratings,
            mask,
            regularization,
        })
    }

    /// The ratings matrix.
    pub fn ratings(&self) -> &DMatrix<T> {
        self.ratings
    }

    /// The observation mask.
    pub fn mask(&self) -> &ObservationMask {
        self.mask
    }

    /// The regularization strength.
    pub fn regularization(&self) -> T {
        self.regularization
    }

    /// Evaluates the cost at `(X, Θ)`.
    pub fn cost(&self, item: &DMatrix<T>, user: &DMatrix<T>) -> Result<T> {
        check_factors(item, user, self.ratings, self.mask)?;
        let residual = masked_residual(item, user, self.ratings, self.mask);
        Ok(self.cost_from_residual(&residual, item, user))
    }

    /// Evaluates both gradients at `(X, Θ)`.
    pub fn gradients(&self, item: &DMatrix<T>, user: &DMatrix<T>) -> Result<Gradients<T>> {
        check_factors(item, user, self.ratings, self.mask)?;
        let residual = masked_residual(item, user, self.ratings, self.mask);
        Ok(self.gradients_from_residual(&residual, item, user))
    }

    /// Evaluates the cost and both gradients from a single residual.
    pub fn cost_and_gradients(
        &self,
        item: &DMatrix<T>,
        user: &DMatrix<T>,
    ) -> Result<(T, Gradients<T>)> {
        check_factors(item, user, self.ratings, self.mask)?;
        let residual = masked_residual(item, user, self.ratings, self.mask);
        let cost = self.cost_from_residual(&residual, item, user);
        Ok((cost, self.gradients_from_residual(&residual, item, user)))
    }

    /// Applies one gradient-descent step to `factors` in place.
    ///
    /// Both gradients are computed before either matrix changes. On error
    /// the factors are left untouched.
    pub fn step(&self, factors: &mut FactorPair<T>, learning_rate: T) -> Result<()> {
        let gradients = self.gradients(&factors.item, &factors.user)?;
        apply_gradients(&mut factors.item, &mut factors.user, &gradients, learning_rate);
        Ok(())
    }

    fn cost_from_residual(&self, residual: &DMatrix<T>, item: &DMatrix<T>, user: &DMatrix<T>) -> T {
        let half = constants::half::<T>();
        let squared_error = residual.norm_squared();
        let penalty = item.norm_squared() + user.norm_squared();
        half * squared_error + half * self.regularization * penalty
    }

    fn gradients_from_residual(
        &self,
        residual: &DMatrix<T>,
        item: &DMatrix<T>,
        user: &DMatrix<T>,
    ) -> Gradients<T> {
        Gradients {
            item: residual * user + item * self.regularization,
            user: residual.tr_mul(item) + user * self.regularization,
        }
    }
}

pub(crate) fn apply_gradients<T: Scalar>(
    item: &mut DMatrix<T>,
    user: &mut DMatrix<T>,
    gradients: &Gradients<T>,
    learning_rate: T,
) {
    *item -= &gradients.item * learning_rate;
    *user -= &gradients.user * learning_rate;
}

/// Computes `½ Σ ((X Θᵗ − Y) ∘ R)² + (reg/2)(‖X‖_F² + ‖Θ‖_F²)`.
///
/// Returns `InvalidDimensions` when any shape disagrees. Non-finite values
/// in observed entries or factors propagate into the result.
pub fn compute_cost<T: Scalar>(
    item_factors: &DMatrix<T>,
    user_factors: &DMatrix<T>,
    ratings: &DMatrix<T>,
    mask: &ObservationMask,
    regularization: T,
) -> Result<T> {
    MaskedSquaredError::new(ratings, mask, regularization)?.cost(item_factors, user_factors)
}

/// Computes `(E Θ + reg X, Eᵗ X + reg Θ)`.
pub fn compute_gradients<T: Scalar>(
    item_factors: &DMatrix<T>,
    user_factors: &DMatrix<T>,
    ratings: &DMatrix<T>,
    mask: &ObservationMask,
    regularization: T,
) -> Result<(DMatrix<T>, DMatrix<T>)> {
    let gradients = MaskedSquaredError::new(ratings, mask, regularization)?
        .gradients(item_factors, user_factors)?;
    Ok((gradients.item, gradients.user))
}

/// Computes the cost together with both gradients, sharing one residual.
pub fn compute_cost_and_gradients<T: Scalar>(
    item_factors: &DMatrix<T>,
    user_factors: &DMatrix<T>,
    ratings: &DMatrix<T>,
    mask: &ObservationMask,
    regularization: T,
) -> Result<(T, DMatrix<T>, DMatrix<T>)> {
    let (cost, gradients) = MaskedSquaredError::new(ratings, mask, regularization)?
        .cost_and_gradients(item_factors, user_factors)?;
    Ok((cost, gradients.item, gradients.user))
}

/// Applies one batch gradient-descent step to `(X, Θ)` in place.
///
/// Both gradients come from the same snapshot of `(X, Θ)`. Shapes are
/// validated first, so an error leaves both matrices unchanged.
pub fn update_step<T: Scalar>(
    item_factors: &mut DMatrix<T>,
    user_factors: &mut DMatrix<T>,
    ratings: &DMatrix<T>,
    mask: &ObservationMask,
    regularization: T,
    learning_rate: T,
) -> Result<()> {
    let gradients = MaskedSquaredError::new(ratings, mask, regularization)?
        .gradients(item_factors, user_factors)?;
    apply_gradients(item_factors, user_factors, &gradients, learning_rate);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cofactor_core::error::FactorizationError;

    fn small_problem() -> (DMatrix<f64>, DMatrix<f64>, DMatrix<f64>, ObservationMask) {
        let x = DMatrix::from_row_slice(3, 2, &[0.5, -1.0, 1.5, 0.2, -0.3, 0.8]);
        let theta = DMatrix::from_row_slice(2, 2, &[1.0, 0.4, -0.6, 0.9]);
        let y = DMatrix::from_row_slice(3, 2, &[4.0, 0.0, 2.0, 5.0, 0.0, 1.0]);
        let r = ObservationMask::from_sentinel(&y, 0.0);
        (x, theta, y, r)
    }

    /// Reference cost written out entry by entry.
    fn reference_cost(x: &DMatrix<f64>, theta: &DMatrix<f64>, y: &DMatrix<f64>, r: &ObservationMask, reg: f64) -> f64 {
        let mut cost = 0.0;
        for i in 0..y.nrows() {
            for j in 0..y.ncols() {
                if r.is_observed(i, j) {
                    let e = x.row(i).dot(&theta.row(j)) - y[(i, j)];
                    cost += 0.5 * e * e;
                }
            }
        }
        cost + 0.5 * reg * (x.norm_squared() + theta.norm_squared())
    }

    #[test]
    fn test_cost_matches_reference() {
        let (x, theta, y, r) = small_problem();
        for reg in [0.0, 0.1, 2.0] {
            let cost = compute_cost(&x, &theta, &y, &r, reg).unwrap();
            assert_relative_eq!(cost, reference_cost(&x, &theta, &y, &r, reg), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cost_zero_on_exact_fit() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let theta = DMatrix::from_row_slice(2, 1, &[5.0, 1.5]);
        let y = DMatrix::from_row_slice(2, 2, &[5.0, -7.0, 42.0, 3.0]);
        let r = ObservationMask::from_row_slice(2, 2, &[true, false, false, true]).unwrap();

        assert_eq!(compute_cost(&x, &theta, &y, &r, 0.0).unwrap(), 0.0);
        assert!(compute_cost(&x, &theta, &y, &r, 0.1).unwrap() > 0.0);
    }

    #[test]
    fn test_gradients_by_hand() {
        // k = 1, single observed entry: E = x*t - y
        let x = DMatrix::from_element(1, 1, 2.0);
        let theta = DMatrix::from_element(1, 1, 3.0);
        let y = DMatrix::from_element(1, 1, 4.0);
        let r = ObservationMask::all_observed(1, 1);

        let (dx, dtheta) = compute_gradients(&x, &theta, &y, &r, 0.5).unwrap();
        // E = 2; dX = E*t + reg*x = 6 + 1; dT = E*x + reg*t = 4 + 1.5
        assert_relative_eq!(dx[(0, 0)], 7.0);
        assert_relative_eq!(dtheta[(0, 0)], 5.5);
    }

    #[test]
    fn test_cost_and_gradients_agree() {
        let (x, theta, y, r) = small_problem();
        let (cost, dx, dtheta) = compute_cost_and_gradients(&x, &theta, &y, &r, 0.3).unwrap();
        let (dx2, dtheta2) = compute_gradients(&x, &theta, &y, &r, 0.3).unwrap();

        assert_eq!(cost, compute_cost(&x, &theta, &y, &r, 0.3).unwrap());
        assert_eq!(dx, dx2);
        assert_eq!(dtheta, dtheta2);
    }

    #[test]
    fn test_update_step_uses_single_snapshot() {
        let (x, theta, y, r) = small_problem();
        let (reg, alpha) = (0.1, 0.05);
        let (dx, dtheta) = compute_gradients(&x, &theta, &y, &r, reg).unwrap();

        let (mut x1, mut theta1) = (x.clone(), theta.clone());
        update_step(&mut x1, &mut theta1, &y, &r, reg, alpha).unwrap();

        let expected_x = &x - &dx * alpha;
        let expected_theta = &theta - &dtheta * alpha;
        assert_relative_eq!(x1, expected_x, epsilon = 1e-14);
        assert_relative_eq!(theta1, expected_theta, epsilon = 1e-14);

        // Sequential update (new X feeding dTheta) is a different algorithm.
        let (_, dtheta_after) = compute_gradients(&x1, &theta, &y, &r, reg).unwrap();
        let sequential_theta = &theta - &dtheta_after * alpha;
        assert!((sequential_theta - &theta1).norm() > 1e-8);
    }

    #[test]
    fn test_objective_step_matches_free_function() {
        let (x, theta, y, r) = small_problem();
        let objective = MaskedSquaredError::new(&y, &r, 0.2).unwrap();
        let mut factors = FactorPair::new(x.clone(), theta.clone()).unwrap();
        objective.step(&mut factors, 0.01).unwrap();

        let (mut x1, mut theta1) = (x, theta);
        update_step(&mut x1, &mut theta1, &y, &r, 0.2, 0.01).unwrap();
        assert_eq!(factors.item, x1);
        assert_eq!(factors.user, theta1);
    }

    #[test]
    fn test_shape_errors_leave_factors_untouched() {
        let (mut x, mut theta, y, _) = small_problem();
        let bad_mask = ObservationMask::all_observed(2, 3);
        let (x0, theta0) = (x.clone(), theta.clone());

        let err = update_step(&mut x, &mut theta, &y, &bad_mask, 0.0, 0.1).unwrap_err();
        assert!(matches!(err, FactorizationError::InvalidDimensions { .. }));
        assert_eq!(x, x0);
        assert_eq!(theta, theta0);

        let r = ObservationMask::from_sentinel(&y, 0.0);
        let short_theta = DMatrix::zeros(2, 1);
        assert!(compute_cost(&x, &short_theta, &y, &r, 0.0).is_err());
        assert!(compute_gradients(&x, &short_theta, &y, &r, 0.0).is_err());
    }

    #[test]
    fn test_nan_in_observed_entry_propagates() {
        let (x, theta, mut y, _) = small_problem();
        let r = ObservationMask::all_observed(3, 2);
        y[(0, 0)] = f64::NAN;
        assert!(compute_cost(&x, &theta, &y, &r, 0.0).unwrap().is_nan());
    }
}
