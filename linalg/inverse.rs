use approx::AbsDiffEq;

use super::error::MatrixError;
use super::matrix::Matrix;
use super::row_ops::RowReducer;

impl RowReducer {
    /// Inverse of a square matrix.
    ///
    /// 2x2 inputs use the adjugate divided by the determinant. Everything else
    /// goes through Gauss-Jordan reduction, where each row operation applied to
    /// the working copy is mirrored onto an identity matrix; once the working
    /// copy reaches the identity, the mirror holds the inverse.
    pub fn inverse(&self, x: &Matrix) -> Result<Matrix, MatrixError> {
        if !x.is_square() {
            return Err(MatrixError::NonSquare {
                op: "inverse",
                rows: x.rows(),
                cols: x.cols(),
            });
        }

        if x.rows() == 2 {
            return self.inverse_two_by_two(x);
        }
        self.gauss_jordan(x)
    }

    fn inverse_two_by_two(&self, x: &Matrix) -> Result<Matrix, MatrixError> {
        let det = self.determinant(x)?;
        if det == 0.0 || det.abs() < self.fuzz() {
            return Err(MatrixError::Singular {
                reason: "zero determinant",
            });
        }

        let adjugate = Matrix::from_rows(&[
            [x.get(1, 1), -x.get(0, 1)],
            [-x.get(1, 0), x.get(0, 0)],
        ])?;
        Ok(adjugate.scale(1.0 / det))
    }

    fn gauss_jordan(&self, x: &Matrix) -> Result<Matrix, MatrixError> {
        let n = x.rows();
        let identity = Matrix::identity(n);
        let mut z = x.clone();
        let mut p = identity.clone();

        let mut i = 0;
        let mut j = 0;

        loop {
            z.fuzz_clean(self.fuzz());
            if z.abs_diff_eq(&identity, self.fuzz()) {
                log::trace!("Gauss-Jordan reached the identity after {i} pivots");
                return Ok(p);
            }
            if i >= n {
                return Err(MatrixError::Singular {
                    reason: "elimination overflowed rows",
                });
            }
            if j >= n {
                return Err(MatrixError::Singular {
                    reason: "elimination overflowed columns",
                });
            }

            if z.get(i, j) == 0.0 {
                match ((i + 1)..n).find(|&k| z.get(k, j) != 0.0) {
                    Some(k) => {
                        z = self.swap_rows(&z, i, k)?;
                        p = self.swap_rows(&p, i, k)?;
                    }
                    None => j += 1,
                }
                continue;
            }

            for k in 0..n {
                if k == i {
                    let factor = 1.0 / z.get(i, j);
                    z = self.scale_row(&z, i, factor)?;
                    p = self.scale_row(&p, i, factor)?;
                } else {
                    let entry = z.get(k, j);
                    if entry == 0.0 {
                        continue;
                    }
                    let factor = -(entry / z.get(i, j));
                    z = self.add_to_row(&z, k, i, factor)?;
                    p = self.add_to_row(&p, k, i, factor)?;
                }
            }

            // The pivot column is exactly a unit vector once reduced.
            for k in 0..n {
                z.set(k, j, if k == i { 1.0 } else { 0.0 })?;
            }
            i += 1;
        }
    }
}

/// [`RowReducer::inverse`] with default settings.
pub fn inverse(x: &Matrix) -> Result<Matrix, MatrixError> {
    RowReducer::default().inverse(x)
}
