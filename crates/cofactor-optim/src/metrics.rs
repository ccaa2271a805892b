//! Fit quality on the observed entries.

use cofactor_core::{
    error::Result,
    mask::ObservationMask,
    types::{DMatrix, Scalar},
    validation::check_factors,
};
use num_traits::Float;

use crate::factors::FactorPair;

/// Root-mean-square error of the prediction over observed entries.
///
/// Returns `None` when the mask has no observed entry.
pub fn observed_rmse<T: Scalar>(
    factors: &FactorPair<T>,
    ratings: &DMatrix<T>,
    mask: &ObservationMask,
) -> Result<Option<T>> {
    check_factors(&factors.item, &factors.user, ratings, mask)?;

    let count = mask.observed_count();
    if count == 0 {
        return Ok(None);
    }

    let sum_squares = mask
        .observed_positions()
        .map(|(item, user)| {
            let error = factors.item.row(item).dot(&factors.user.row(user)) - ratings[(item, user)];
            error * error
        })
        .fold(T::zero(), |acc, value| acc + value);

    Ok(Some(<T as Float>::sqrt(sum_squares / <T as Scalar>::from_usize(count))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rmse() {
        let factors = FactorPair::new(
            DMatrix::from_row_slice(2, 1, &[1.0, 2.0]),
            DMatrix::from_row_slice(2, 1, &[4.0, 1.0]),
        )
        .unwrap();
        let y = DMatrix::from_row_slice(2, 2, &[5.0, f64::NAN, 0.0, 4.0]);
        let r = ObservationMask::from_row_slice(2, 2, &[true, false, false, true]).unwrap();

        // errors: 4 - 5 = -1, 2 - 4 = -2
        let rmse = observed_rmse(&factors, &y, &r).unwrap().unwrap();
        assert_relative_eq!(rmse, (2.5_f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_rmse_without_observations() {
        let factors = FactorPair::<f64>::zeros(2, 2, 1);
        let y = DMatrix::zeros(2, 2);
        let r = ObservationMask::none_observed(2, 2);
        assert_eq!(observed_rmse(&factors, &y, &r).unwrap(), None);
    }

    #[test]
    fn test_rmse_shape_error() {
        let factors = FactorPair::<f64>::zeros(3, 2, 1);
        let y = DMatrix::zeros(2, 2);
        let r = ObservationMask::none_observed(2, 2);
        assert!(observed_rmse(&factors, &y, &r).is_err());
    }
}
