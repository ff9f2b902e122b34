use super::error::MatrixError;
use super::matrix::Matrix;
use super::row_ops::RowReducer;

fn require_square(x: &Matrix, op: &'static str) -> Result<(), MatrixError> {
    if !x.is_square() {
        return Err(MatrixError::NonSquare {
            op,
            rows: x.rows(),
            cols: x.cols(),
        });
    }
    Ok(())
}

/// True when every off-diagonal entry is zero.
pub fn is_diagonal(x: &Matrix) -> Result<bool, MatrixError> {
    require_square(x, "is_diagonal")?;
    Ok(x.entries().all(|((i, j), _)| i == j))
}

/// True when every entry below the diagonal is zero.
pub fn is_upper_triangular(x: &Matrix) -> Result<bool, MatrixError> {
    require_square(x, "is_upper_triangular")?;
    Ok(x.entries().all(|((i, j), _)| i <= j))
}

pub fn is_lower_triangular(x: &Matrix) -> Result<bool, MatrixError> {
    is_upper_triangular(&x.transpose())
}

impl RowReducer {
    /// Determinant of a square matrix.
    ///
    /// Sizes 2 and 3 use cofactor expansion. Every other size is reduced by
    /// [`RowReducer::gaussian_elimination`]; only swaps and row additions are
    /// applied there, so the determinant is the pivot product times the sign
    /// of the permutation. The empty matrix has determinant 1.
    pub fn determinant(&self, x: &Matrix) -> Result<f64, MatrixError> {
        require_square(x, "determinant")?;

        let m = |i, j| x.get(i, j);
        match x.rows() {
            2 => Ok(m(0, 0) * m(1, 1) - m(0, 1) * m(1, 0)),
            3 => Ok(m(0, 0) * (m(1, 1) * m(2, 2) - m(1, 2) * m(2, 1))
                - m(0, 1) * (m(1, 0) * m(2, 2) - m(1, 2) * m(2, 0))
                + m(0, 2) * (m(1, 0) * m(2, 1) - m(1, 1) * m(2, 0))),
            n => {
                let echelon = self.gaussian_elimination(x)?;
                let pivots: f64 = (0..n).map(|i| echelon.matrix.get(i, i)).product();
                Ok(echelon.permutation_sign() * pivots)
            }
        }
    }
}

/// [`RowReducer::determinant`] with default settings.
pub fn determinant(x: &Matrix) -> Result<f64, MatrixError> {
    RowReducer::default().determinant(x)
}
