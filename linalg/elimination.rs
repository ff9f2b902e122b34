use super::error::MatrixError;
use super::matrix::Matrix;
use super::properties::is_upper_triangular;
use super::row_ops::RowReducer;

/// Result of forward elimination.
#[derive(Debug, Clone, PartialEq)]
pub struct Echelon {
    /// The input reduced to row-echelon form. Pivot rows are not normalised.
    pub matrix: Matrix,
    /// Identity with the same row swaps applied, so `permutation * input`
    /// has the row order that `matrix` was eliminated in.
    pub permutation: Matrix,
    /// Number of row exchanges performed.
    pub swaps: usize,
}

impl Echelon {
    /// `+1.0` for an even number of swaps, `-1.0` for an odd number.
    pub fn permutation_sign(&self) -> f64 {
        if self.swaps % 2 == 0 { 1.0 } else { -1.0 }
    }
}

impl RowReducer {
    /// Gaussian elimination to row-echelon form.
    ///
    /// The cursor `(i, j)` walks down the rows. A zero pivot is replaced by the
    /// first non-zero entry below it in the same column; an all-zero column
    /// moves the column cursor on without consuming a row. Every entry under a
    /// pivot is then cleared with `add_to_row`, and stops early once the working
    /// matrix is upper-triangular.
    pub fn gaussian_elimination(&self, x: &Matrix) -> Result<Echelon, MatrixError> {
        let mut z = x.clone();
        let mut p = Matrix::identity(x.rows());
        let mut swaps = 0;

        let mut i = 0;
        let mut j = 0;

        loop {
            let triangular = z.is_square() && is_upper_triangular(&z)?;
            if triangular || i >= z.rows() || j >= z.cols() {
                log::trace!(
                    "Elimination finished at cursor ({i}, {j}) after {swaps} row swaps"
                );
                return Ok(Echelon {
                    matrix: z,
                    permutation: p,
                    swaps,
                });
            }

            if z.get(i, j) == 0.0 {
                match (i..z.rows()).find(|&k| z.get(k, j) != 0.0) {
                    Some(k) => {
                        z = self.swap_rows(&z, i, k)?;
                        p = self.swap_rows(&p, i, k)?;
                        swaps += 1;
                    }
                    None => j += 1,
                }
                continue;
            }

            for k in (i + 1)..z.rows() {
                let below = z.get(k, j);
                if below == 0.0 {
                    continue;
                }
                z = self.add_to_row(&z, k, i, -(below / z.get(i, j)))?;
                // The eliminated slot is zero by construction.
                z.set(k, j, 0.0)?;
            }

            z.fuzz_clean(self.fuzz());
            i += 1;
        }
    }
}

/// [`RowReducer::gaussian_elimination`] with default settings.
pub fn gaussian_elimination(x: &Matrix) -> Result<Echelon, MatrixError> {
    RowReducer::default().gaussian_elimination(x)
}
