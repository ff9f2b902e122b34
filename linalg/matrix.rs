//! # Sparse Matrix
//!
//! The single value type of the engine. Only non-zero entries are stored, keyed
//! by `(row, col)` in a `BTreeMap`. Sorted keys give two things the algorithms
//! rely on:
//!
//! - Row-range queries, so a product only visits the non-zero entries of the
//!   rows it actually needs.
//! - A fixed summation order, so the same inputs always round the same way.
//!
//! Invariant: no stored value is ever `0.0`. Writing zero removes the key.
//!
//! Every transforming operation returns a fresh `Matrix`; nothing here hands
//! out shared mutable access to another matrix's storage.

use std::collections::BTreeMap;
use std::fmt;

use approx::AbsDiffEq;
use itertools::Itertools;

use super::config::DEFAULT_FUZZ;
use super::error::MatrixError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    entries: BTreeMap<(usize, usize), f64>,
}

impl Matrix {
    /// An `rows x cols` matrix with no stored entries.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: BTreeMap::new(),
        }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            rows: n,
            cols: n,
            entries: (0..n).map(|i| ((i, i), 1.0)).collect(),
        }
    }

    /// Builds a matrix from dense rows. Zeros are dropped on the way in.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());
        let mut matrix = Self::zero(rows.len(), cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MatrixError::RaggedRows {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (j, &value) in row.iter().enumerate() {
                matrix.set(i, j, value)?;
            }
        }
        Ok(matrix)
    }

    /// A single-column matrix holding `values`.
    pub fn column(values: &[f64]) -> Self {
        let mut matrix = Self::zero(values.len(), 1);
        for (i, &value) in values.iter().enumerate() {
            if value != 0.0 {
                matrix.entries.insert((i, 0), value);
            }
        }
        matrix
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// The stored value at `(i, j)`, or `0.0` when nothing is stored there.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.entries.get(&(i, j)).copied().unwrap_or(0.0)
    }

    /// Overwrites `(i, j)`. Writing `0.0` deletes the entry.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<(), MatrixError> {
        self.check_bounds(i, j)?;
        if value == 0.0 {
            self.entries.remove(&(i, j));
        } else {
            self.entries.insert((i, j), value);
        }
        Ok(())
    }

    /// Adds `delta` to `(i, j)`. A zero delta never creates an entry, and a sum
    /// that lands exactly on zero removes it.
    pub fn update(&mut self, i: usize, j: usize, delta: f64) -> Result<(), MatrixError> {
        self.check_bounds(i, j)?;
        if delta == 0.0 {
            return Ok(());
        }
        let updated = self.get(i, j) + delta;
        self.set(i, j, updated)
    }

    /// Stored entries in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.entries.iter().map(|(&key, &value)| (key, value))
    }

    /// Stored entries of row `i` as `(col, value)`, in column order.
    pub fn row_entries(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries
            .range((i, 0)..(i + 1, 0))
            .map(|(&(_, j), &value)| (j, value))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.cols]; self.rows];
        for (&(i, j), &value) in &self.entries {
            dense[i][j] = value;
        }
        dense
    }

    /// The first column as a plain vector.
    pub fn column_values(&self) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, 0)).collect()
    }

    /// Deletes every entry whose magnitude is below `fuzz`. NaN has no
    /// magnitude to compare and is kept.
    pub fn fuzz_clean(&mut self, fuzz: f64) {
        self.entries
            .retain(|_, value| *value != 0.0 && !(value.abs() < fuzz));
    }

    /// Tolerance equality: equal shapes, equal non-zero counts, and every
    /// coordinate within `fuzz`.
    pub fn approx_equal(&self, other: &Self, fuzz: f64) -> bool {
        self.abs_diff_eq(other, fuzz)
    }

    pub fn transpose(&self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
            entries: self
                .entries
                .iter()
                .map(|(&(i, j), &value)| ((j, i), value))
                .collect(),
        }
    }

    /// `self * rhs`, cleaned with the default fuzz.
    pub fn multiply(&self, rhs: &Self) -> Result<Self, MatrixError> {
        self.multiply_with(rhs, DEFAULT_FUZZ)
    }

    /// `self * rhs` by triple-sum accumulation, followed by a cleanup pass
    /// that deletes any result entry below `fuzz`.
    pub fn multiply_with(&self, rhs: &Self, fuzz: f64) -> Result<Self, MatrixError> {
        if self.cols != rhs.rows {
            return Err(MatrixError::DimensionMismatch {
                op: "multiply",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut product = Self::zero(self.rows, rhs.cols);
        for (&(i, k), &a) in &self.entries {
            for (j, b) in rhs.row_entries(k) {
                *product.entries.entry((i, j)).or_insert(0.0) += a * b;
            }
        }
        product.fuzz_clean(fuzz);
        Ok(product)
    }

    pub fn add(&self, rhs: &Self) -> Result<Self, MatrixError> {
        if self.shape() != rhs.shape() {
            return Err(MatrixError::DimensionMismatch {
                op: "add",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut sum = self.clone();
        for (&(i, j), &value) in &rhs.entries {
            sum.update(i, j, value)?;
        }
        Ok(sum)
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            entries: self
                .entries
                .iter()
                .map(|(&key, &value)| (key, value * factor))
                .filter(|&(_, value)| value != 0.0)
                .collect(),
        }
    }

    fn check_bounds(&self, i: usize, j: usize) -> Result<(), MatrixError> {
        if i >= self.rows || j >= self.cols {
            return Err(MatrixError::OutOfRange {
                row: i,
                col: j,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

impl AbsDiffEq for Matrix {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        DEFAULT_FUZZ
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        if self.shape() != other.shape() || self.nnz() != other.nnz() {
            return false;
        }
        self.entries
            .keys()
            .chain(other.entries.keys())
            .all(|&(i, j)| (self.get(i, j) - other.get(i, j)).abs() <= epsilon)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            writeln!(f, "{}", row.iter().join("\t"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix {
        Matrix::from_rows(&[[1.4, 4.4], [3.2, 2.0], [2.9, 9.3], [0.3, 3.8]]).unwrap()
    }

    #[test]
    fn zero_has_no_entries() {
        let m = Matrix::zero(3, 4);
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.nnz(), 0);
        assert_eq!(m.get(2, 3), 0.0);
    }

    #[test]
    fn identity_stores_only_the_diagonal() {
        let m = Matrix::identity(3);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.get(1, 1), 1.0);
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn writing_zero_deletes_the_entry() {
        let mut m = Matrix::zero(2, 2);
        m.set(0, 1, 5.0).unwrap();
        assert_eq!(m.nnz(), 1);
        m.set(0, 1, 0.0).unwrap();
        assert_eq!(m.nnz(), 0);
    }

    #[test]
    fn set_rejects_coordinates_at_the_boundary() {
        let mut m = Matrix::zero(2, 3);
        assert_eq!(
            m.set(2, 0, 1.0),
            Err(MatrixError::OutOfRange {
                row: 2,
                col: 0,
                rows: 2,
                cols: 3
            })
        );
        assert!(m.set(0, 3, 1.0).is_err());
        assert!(m.set(1, 2, 1.0).is_ok());
    }

    #[test]
    fn update_with_zero_delta_creates_nothing() {
        let mut m = Matrix::zero(2, 2);
        m.update(1, 1, 0.0).unwrap();
        assert_eq!(m.nnz(), 0);

        m.update(1, 1, 2.5).unwrap();
        m.update(1, 1, -2.5).unwrap();
        assert_eq!(m.nnz(), 0);

        assert!(m.update(2, 0, 1.0).is_err());
    }

    #[test]
    fn clone_does_not_alias_storage() {
        let original = sample();
        let mut copy = original.clone();
        copy.set(0, 0, 99.0).unwrap();
        assert_eq!(original.get(0, 0), 1.4);
        assert_eq!(copy.get(0, 0), 99.0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn transpose_swaps_coordinates() {
        let m = sample();
        let t = m.transpose();
        assert_eq!(t.shape(), (2, 4));
        assert_eq!(t.get(1, 2), 9.3);
        assert_eq!(t.transpose(), m);

        let empty = Matrix::zero(0, 0);
        assert_eq!(empty.transpose(), empty);
    }

    #[test]
    fn multiply_checks_inner_dimensions() {
        let m = sample();
        let err = m.multiply(&m).unwrap_err();
        assert_eq!(
            err,
            MatrixError::DimensionMismatch {
                op: "multiply",
                left: (4, 2),
                right: (4, 2)
            }
        );
    }

    #[test]
    fn multiply_matches_hand_computed_product() {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(&[[0.0, 1.0], [1.0, 0.0]]).unwrap();
        let expected = Matrix::from_rows(&[[2.0, 1.0], [4.0, 3.0]]).unwrap();
        assert_eq!(a.multiply(&b).unwrap(), expected);
    }

    #[test]
    fn multiply_drops_results_below_the_fuzz() {
        let a = Matrix::from_rows(&[[1.0, 1.0]]).unwrap();
        let b = Matrix::from_rows(&[[1.0], [-1.0 + 1e-16]]).unwrap();
        let product = a.multiply(&b).unwrap();
        assert_eq!(product.shape(), (1, 1));
        assert_eq!(product.nnz(), 0);
    }

    #[test]
    fn multiply_by_identity_is_a_no_op() {
        let m = sample();
        let product = m.multiply(&Matrix::identity(2)).unwrap();
        assert_abs_diff_eq!(product, m);
    }

    #[test]
    fn add_requires_equal_shapes() {
        let a = Matrix::identity(2);
        assert!(a.add(&Matrix::zero(2, 3)).is_err());

        let sum = a.add(&a.scale(-1.0)).unwrap();
        assert_eq!(sum.nnz(), 0);
    }

    #[test]
    fn scale_by_zero_empties_the_matrix() {
        let m = sample().scale(0.0);
        assert_eq!(m.shape(), (4, 2));
        assert_eq!(m.nnz(), 0);
    }

    #[test]
    fn equality_requires_matching_non_zero_counts() {
        let a = Matrix::from_rows(&[[1.0, 0.0]]).unwrap();
        let mut b = a.clone();
        b.set(0, 1, 1e-16).unwrap();
        assert!(!a.approx_equal(&b, DEFAULT_FUZZ));

        let c = Matrix::from_rows(&[[1.0 + 1e-15, 0.0]]).unwrap();
        assert!(a.approx_equal(&c, DEFAULT_FUZZ));
        assert!(!a.approx_equal(&Matrix::zero(1, 3), DEFAULT_FUZZ));
    }

    #[test]
    fn fuzz_clean_keeps_non_finite_entries() {
        let mut m = Matrix::zero(2, 2);
        m.set(0, 0, f64::NAN).unwrap();
        m.set(0, 1, f64::INFINITY).unwrap();
        m.set(1, 0, 1e-20).unwrap();
        m.fuzz_clean(DEFAULT_FUZZ);

        assert_eq!(m.nnz(), 2);
        assert!(m.get(0, 0).is_nan());
        assert_eq!(m.get(0, 1), f64::INFINITY);
    }

    #[test]
    fn nan_survives_multiplication() {
        let a = Matrix::from_rows(&[[1.0, f64::NAN]]).unwrap();
        let product = a.multiply(&Matrix::column(&[2.0, 3.0])).unwrap();
        assert_eq!(product.nnz(), 1);
        assert!(product.get(0, 0).is_nan());
    }

    #[test]
    fn row_entries_only_visit_one_row() {
        let m = sample();
        let row: Vec<_> = m.row_entries(2).collect();
        assert_eq!(row, vec![(0, 2.9), (1, 9.3)]);
    }

    #[test]
    fn display_renders_tab_separated_rows() {
        let m = Matrix::from_rows(&[[1.0, 0.0], [0.5, 2.0]]).unwrap();
        assert_eq!(m.to_string(), "1\t0\n0.5\t2\n");
    }
}
