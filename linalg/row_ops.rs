//! Elementary row operations.
//!
//! Under [`RowOpStrategy::Elementary`] each operation builds an identity
//! matrix, encodes the row transform into it and left-multiplies it onto the
//! target, so elimination and inversion are pure compositions of `multiply`.
//! [`RowOpStrategy::Direct`] performs the same transform on a copy of the
//! rows in place and is checked against the multiply-based definition.

use super::config::{LinalgConfig, RowOpStrategy};
use super::error::MatrixError;
use super::matrix::Matrix;

/// Carries the numerical settings used by the row operations and by the
/// elimination, inversion and determinant algorithms built on top of them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowReducer {
    config: LinalgConfig,
}

impl RowReducer {
    pub fn new(config: LinalgConfig) -> Self {
        Self { config }
    }

    pub fn fuzz(&self) -> f64 {
        self.config.fuzz
    }

    /// Exchanges rows `r1` and `r2`.
    pub fn swap_rows(&self, x: &Matrix, r1: usize, r2: usize) -> Result<Matrix, MatrixError> {
        check_row(x, r1)?;
        check_row(x, r2)?;

        match self.config.row_ops {
            RowOpStrategy::Elementary => {
                let mut elementary = Matrix::identity(x.rows());
                elementary.set(r1, r1, 0.0)?;
                elementary.set(r2, r2, 0.0)?;
                elementary.set(r1, r2, 1.0)?;
                elementary.set(r2, r1, 1.0)?;
                elementary.multiply_with(x, self.fuzz())
            }
            RowOpStrategy::Direct => {
                let mut z = x.clone();
                let first: Vec<_> = x.row_entries(r1).collect();
                let second: Vec<_> = x.row_entries(r2).collect();
                for &(j, _) in first.iter().chain(second.iter()) {
                    z.set(r1, j, 0.0)?;
                    z.set(r2, j, 0.0)?;
                }
                for (j, value) in first {
                    z.set(r2, j, value)?;
                }
                for (j, value) in second {
                    z.set(r1, j, value)?;
                }
                z.fuzz_clean(self.fuzz());
                Ok(z)
            }
        }
    }

    /// Multiplies row `r` by `factor`.
    pub fn scale_row(&self, x: &Matrix, r: usize, factor: f64) -> Result<Matrix, MatrixError> {
        check_row(x, r)?;

        match self.config.row_ops {
            RowOpStrategy::Elementary => {
                let mut elementary = Matrix::identity(x.rows());
                elementary.set(r, r, factor)?;
                elementary.multiply_with(x, self.fuzz())
            }
            RowOpStrategy::Direct => {
                let mut z = x.clone();
                let row: Vec<_> = x.row_entries(r).collect();
                for (j, value) in row {
                    z.set(r, j, value * factor)?;
                }
                z.fuzz_clean(self.fuzz());
                Ok(z)
            }
        }
    }

    /// Adds `factor` times row `source` into row `target`.
    ///
    /// With `target == source` the elementary matrix has `factor` on that
    /// diagonal slot, so the row is scaled by `factor`. Both strategies share
    /// that behaviour.
    pub fn add_to_row(
        &self,
        x: &Matrix,
        target: usize,
        source: usize,
        factor: f64,
    ) -> Result<Matrix, MatrixError> {
        check_row(x, target)?;
        check_row(x, source)?;

        match self.config.row_ops {
            RowOpStrategy::Elementary => {
                let mut elementary = Matrix::identity(x.rows());
                elementary.set(target, source, factor)?;
                elementary.multiply_with(x, self.fuzz())
            }
            RowOpStrategy::Direct if target == source => self.scale_row(x, target, factor),
            RowOpStrategy::Direct => {
                let mut z = x.clone();
                for (j, value) in x.row_entries(source) {
                    z.update(target, j, factor * value)?;
                }
                z.fuzz_clean(self.fuzz());
                Ok(z)
            }
        }
    }
}

fn check_row(x: &Matrix, row: usize) -> Result<(), MatrixError> {
    if row >= x.rows() {
        return Err(MatrixError::RowOutOfRange {
            row,
            rows: x.rows(),
        });
    }
    Ok(())
}

/// [`RowReducer::swap_rows`] with default settings.
pub fn swap_rows(x: &Matrix, r1: usize, r2: usize) -> Result<Matrix, MatrixError> {
    RowReducer::default().swap_rows(x, r1, r2)
}

/// [`RowReducer::scale_row`] with default settings.
pub fn scale_row(x: &Matrix, r: usize, factor: f64) -> Result<Matrix, MatrixError> {
    RowReducer::default().scale_row(x, r, factor)
}

/// [`RowReducer::add_to_row`] with default settings.
pub fn add_to_row(
    x: &Matrix,
    target: usize,
    source: usize,
    factor: f64,
) -> Result<Matrix, MatrixError> {
    RowReducer::default().add_to_row(x, target, source, factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix {
        Matrix::from_rows(&[[1.4, 4.4], [3.2, 2.0], [2.9, 9.3], [0.3, 3.8]]).unwrap()
    }

    fn both_strategies() -> [RowReducer; 2] {
        [
            RowReducer::new(LinalgConfig::default().with_row_ops(RowOpStrategy::Elementary)),
            RowReducer::new(LinalgConfig::default().with_row_ops(RowOpStrategy::Direct)),
        ]
    }

    #[test]
    fn swap_rows_exchanges_first_and_third() {
        let want = Matrix::from_rows(&[[2.9, 9.3], [3.2, 2.0], [1.4, 4.4], [0.3, 3.8]]).unwrap();
        for reducer in both_strategies() {
            let got = reducer.swap_rows(&sample(), 0, 2).unwrap();
            assert_abs_diff_eq!(got, want);
        }
    }

    #[test]
    fn swapping_a_row_with_itself_changes_nothing() {
        for reducer in both_strategies() {
            let got = reducer.swap_rows(&sample(), 1, 1).unwrap();
            assert_abs_diff_eq!(got, sample());
        }
    }

    #[test]
    fn scale_row_doubles_the_first_row() {
        let want = Matrix::from_rows(&[[2.8, 8.8], [3.2, 2.0], [2.9, 9.3], [0.3, 3.8]]).unwrap();
        for reducer in both_strategies() {
            let got = reducer.scale_row(&sample(), 0, 2.0).unwrap();
            assert_abs_diff_eq!(got, want);
        }
    }

    #[test]
    fn add_to_row_subtracts_twice_the_first_row() {
        let want = Matrix::from_rows(&[[1.4, 4.4], [3.2, 2.0], [0.1, 0.5], [0.3, 3.8]]).unwrap();
        for reducer in both_strategies() {
            let got = reducer.add_to_row(&sample(), 2, 0, -2.0).unwrap();
            assert_abs_diff_eq!(got, want);
        }
    }

    #[test]
    fn add_to_row_onto_itself_scales_the_row() {
        for reducer in both_strategies() {
            let got = reducer.add_to_row(&sample(), 1, 1, 3.0).unwrap();
            assert_abs_diff_eq!(got.get(1, 0), 9.6, epsilon = 1e-12);
            assert_abs_diff_eq!(got.get(1, 1), 6.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn row_indices_at_the_row_count_are_rejected() {
        let m = sample();
        for reducer in both_strategies() {
            assert_eq!(
                reducer.swap_rows(&m, 0, 4),
                Err(MatrixError::RowOutOfRange { row: 4, rows: 4 })
            );
            assert!(reducer.scale_row(&m, 4, 1.0).is_err());
            assert!(reducer.add_to_row(&m, 4, 0, 1.0).is_err());
            assert!(reducer.add_to_row(&m, 0, 4, 1.0).is_err());
            assert!(reducer.swap_rows(&m, 3, 3).is_ok());
        }
    }

    #[test]
    fn operations_leave_the_input_untouched() {
        let m = sample();
        let swapped = swap_rows(&m, 0, 3).unwrap();
        assert_ne!(swapped, m);
        assert_eq!(m, sample());
    }
}
