//! Type definitions and aliases for matrix factorization.
//!
//! This module provides the scalar trait shared by every numeric routine,
//! the dense matrix aliases the engine operates on, and a handful of
//! numerical constants.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in factorization (f32 or f64).
///
/// This trait combines all the numeric traits required by the cost,
/// gradient and update routines.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Default step for central finite differences.
    const FINITE_DIFFERENCE_STEP: Self;

    /// Default tolerance when comparing analytic and numerical gradients.
    const GRADIENT_CHECK_TOLERANCE: Self;

    /// Convert from f64 (for constants and random draws).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Convert to f64 (for logging and error reporting).
    ///
    /// Values that cannot be represented become NaN.
    fn as_f64(self) -> f64 {
        num_traits::cast(self).unwrap_or(f64::NAN)
    }

    /// Convert from usize (for entry counts).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }

    /// Returns `true` if the value is neither infinite nor NaN.
    fn is_finite_value(self) -> bool {
        <Self as Float>::is_finite(self)
    }
}

impl Scalar for f32 {
    const FINITE_DIFFERENCE_STEP: Self = 1e-3;
    const GRADIENT_CHECK_TOLERANCE: Self = 1e-2;
}

impl Scalar for f64 {
    const FINITE_DIFFERENCE_STEP: Self = 1e-6;
    const GRADIENT_CHECK_TOLERANCE: Self = 1e-5;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Shape of a matrix as `(rows, columns)`.
pub type Shape = (usize, usize);

/// Numerical constants for different precision levels.
pub mod constants {
    use super::Scalar;

    /// Get the default finite-difference step.
    pub fn finite_difference_step<T: Scalar>() -> T {
        T::FINITE_DIFFERENCE_STEP
    }

    /// Get the default gradient-check tolerance.
    pub fn gradient_check_tolerance<T: Scalar>() -> T {
        T::GRADIENT_CHECK_TOLERANCE
    }

    /// One half, used by the squared-error cost.
    pub fn half<T: Scalar>() -> T {
        <T as Scalar>::from_f64(0.5)
    }
}
