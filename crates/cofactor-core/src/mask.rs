//! Observation mask for partially observed ratings.
//!
//! A mask has the same shape as the ratings matrix and marks which entries
//! hold genuine observations. Everything downstream (cost, gradients,
//! metrics) consults the mask instead of the stored value, so the
//! placeholder used for unobserved entries is irrelevant, NaN included.

use crate::{
    error::{FactorizationError, Result},
    types::{DMatrix, Scalar, Shape},
};

/// Boolean matrix marking observed entries of a ratings matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationMask {
    observed: DMatrix<bool>,
}

impl ObservationMask {
    /// Wraps an explicit boolean matrix.
    pub fn new(observed: DMatrix<bool>) -> Self {
        Self { observed }
    }

    /// Builds a mask from a row-major slice of flags.
    pub fn from_row_slice(n_rows: usize, n_cols: usize, flags: &[bool]) -> Result<Self> {
        if flags.len() != n_rows * n_cols {
            return Err(FactorizationError::invalid_dimensions(
                format!("{} flags for a ({n_rows}, {n_cols}) mask", n_rows * n_cols),
                format!("{} flags", flags.len()),
            ));
        }
        Ok(Self::new(DMatrix::from_row_slice(n_rows, n_cols, flags)))
    }

    /// Marks every entry whose value differs from `sentinel` as observed.
    ///
    /// A NaN sentinel marks the non-NaN entries as observed.
    pub fn from_sentinel<T: Scalar>(ratings: &DMatrix<T>, sentinel: T) -> Self {
        if <T as num_traits::Float>::is_nan(sentinel) {
            return Self::from_predicate(ratings, |value| !<T as num_traits::Float>::is_nan(value));
        }
        Self::from_predicate(ratings, |value| value != sentinel)
    }

    /// Marks entries for which `predicate` returns `true` as observed.
    pub fn from_predicate<T, F>(ratings: &DMatrix<T>, predicate: F) -> Self
    where
        T: Scalar,
        F: FnMut(T) -> bool,
    {
        Self::new(ratings.map(predicate))
    }

    /// A mask with every entry observed.
    pub fn all_observed(n_rows: usize, n_cols: usize) -> Self {
        Self::new(DMatrix::from_element(n_rows, n_cols, true))
    }

    /// A mask with no entry observed.
    pub fn none_observed(n_rows: usize, n_cols: usize) -> Self {
        Self::new(DMatrix::from_element(n_rows, n_cols, false))
    }

    /// Shape of the mask as `(rows, columns)`.
    pub fn shape(&self) -> Shape {
        self.observed.shape()
    }

    /// Whether entry `(row, col)` is observed. Out-of-range entries are not.
    pub fn is_observed(&self, row: usize, col: usize) -> bool {
        self.observed.get((row, col)).copied().unwrap_or(false)
    }

    /// Number of observed entries.
    pub fn observed_count(&self) -> usize {
        self.observed.iter().filter(|&&flag| flag).count()
    }

    /// Fraction of observed entries, `0` for an empty mask.
    pub fn density(&self) -> f64 {
        let total = self.observed.len();
        if total == 0 {
            return 0.0;
        }
        self.observed_count() as f64 / total as f64
    }

    /// Iterates over the `(row, col)` positions of observed entries, column by column.
    pub fn observed_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n_rows = self.observed.nrows();
        self.observed
            .iter()
            .enumerate()
            .filter(|(_, &flag)| flag)
            .map(move |(index, _)| (index % n_rows, index / n_rows))
    }

    /// Borrows the underlying boolean matrix.
    pub fn as_matrix(&self) -> &DMatrix<bool> {
        &self.observed
    }

    /// Zeroes every entry of `values` that is not observed.
    ///
    /// Entries are overwritten rather than scaled, so NaN or infinite values
    /// at unobserved positions are discarded too.
    pub fn apply<T: Scalar>(&self, values: &mut DMatrix<T>) -> Result<()> {
        if values.shape() != self.shape() {
            return Err(FactorizationError::invalid_dimensions(
                format!("matrix of shape {:?}", self.shape()),
                format!("{:?}", values.shape()),
            ));
        }
        for (value, &flag) in values.iter_mut().zip(self.observed.iter()) {
            if !flag {
                *value = T::zero();
            }
        }
        Ok(())
    }
}

impl From<DMatrix<bool>> for ObservationMask {
    fn from(observed: DMatrix<bool>) -> Self {
        Self::new(observed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sentinel() {
        let ratings = DMatrix::from_row_slice(2, 3, &[5.0, 0.0, 1.0, 0.0, 3.0, 0.0]);
        let mask = ObservationMask::from_sentinel(&ratings, 0.0);

        assert_eq!(mask.shape(), (2, 3));
        assert!(mask.is_observed(0, 0));
        assert!(!mask.is_observed(0, 1));
        assert!(mask.is_observed(1, 1));
        assert_eq!(mask.observed_count(), 3);
        assert!((mask.density() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nan_sentinel() {
        let ratings = DMatrix::from_row_slice(1, 3, &[f64::NAN, 2.0, f64::NAN]);
        let mask = ObservationMask::from_sentinel(&ratings, f64::NAN);
        let positions: Vec<_> = mask.observed_positions().collect();
        assert_eq!(positions, vec![(0, 1)]);
    }

    #[test]
    fn test_from_row_slice_length() {
        assert!(ObservationMask::from_row_slice(2, 2, &[true, false, false, true]).is_ok());
        let err = ObservationMask::from_row_slice(2, 2, &[true]).unwrap_err();
        assert!(matches!(err, FactorizationError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_observed_positions_order() {
        let mask = ObservationMask::from_row_slice(2, 2, &[true, true, false, true]).unwrap();
        let positions: Vec<_> = mask.observed_positions().collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_apply_discards_non_finite() {
        let mask = ObservationMask::from_row_slice(2, 2, &[true, false, false, true]).unwrap();
        let mut values = DMatrix::from_row_slice(2, 2, &[1.0, f64::NAN, f64::INFINITY, 4.0]);
        mask.apply(&mut values).unwrap();
        assert_eq!(values, DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 4.0]));
    }

    #[test]
    fn test_apply_shape_mismatch() {
        let mask = ObservationMask::all_observed(2, 2);
        let mut values = DMatrix::<f64>::zeros(3, 2);
        assert!(mask.apply(&mut values).is_err());
    }

    #[test]
    fn test_empty_mask() {
        let mask = ObservationMask::none_observed(0, 0);
        assert_eq!(mask.observed_count(), 0);
        assert_eq!(mask.density(), 0.0);
        assert!(!mask.is_observed(0, 0));
    }
}
