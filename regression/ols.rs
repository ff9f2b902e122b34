//! # Ordinary Least Squares
//!
//! Assembles the design matrix `X` (intercept column plus the explanatory
//! columns) and the response `y` from a [`Table`], then evaluates the normal
//! equations with the sparse engine:
//!
//! ```text
//! Xt         = Xᵀ
//! XtX        = Xt · X
//! XtX_inv    = (XtX)⁻¹
//! XtX_inv_Xt = XtX_inv · Xt
//! coef       = XtX_inv_Xt · y
//! hat        = X · XtX_inv_Xt
//! fitted     = hat · y
//! ```
//!
//! Any failure aborts the whole fit; there is no partial result.

use thiserror::Error;

use super::formula::Formula;
use super::model::RegressionModel;
use super::table::Table;
use crate::linalg::{LinalgConfig, Matrix, MatrixError, RowReducer};

#[derive(Error, Debug)]
pub enum RegressionError {
    #[error("Column '{0}' was not found in the table header.")]
    ColumnNotFound(String),
    #[error("Could not parse '{value}' in column '{column}' (data row {row}) as a number.")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },
    #[error(
        "Non-finite value '{value}' in column '{column}' (data row {row}). Every field must be a finite number."
    )]
    NonFinite {
        row: usize,
        column: String,
        value: String,
    },
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Where each design column comes from in the table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DesignLayout {
    /// Header positions of the explanatory columns, in header order. Design
    /// column `k + 1` holds `columns[k]`.
    pub columns: Vec<(usize, String)>,
}

impl DesignLayout {
    /// Orders the requested explanatory names by their position in the header.
    pub fn new(table: &Table, names: &[String]) -> Result<Self, RegressionError> {
        let positions = table.column_positions();
        let mut columns = names
            .iter()
            .map(|name| {
                positions
                    .get(name.as_str())
                    .map(|&index| (index, name.clone()))
                    .ok_or_else(|| RegressionError::ColumnNotFound(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        columns.sort_by_key(|&(index, _)| index);
        columns.dedup_by_key(|(index, _)| *index);
        Ok(Self { columns })
    }

    pub fn width(&self) -> usize {
        self.columns.len() + 1
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Data rows (1-based) that end, by an empty field or a short record,
    /// before one of the explanatory columns.
    pub fn truncated_rows(&self, table: &Table) -> Vec<usize> {
        let Some(last) = self.columns.iter().map(|&(index, _)| index).max() else {
            return Vec::new();
        };
        table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                let end = row.iter().position(String::is_empty).unwrap_or(row.len());
                last >= end
            })
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Builds the `n x (k + 1)` design matrix, and the response vector when a
    /// response column is given. Every field up to the first empty one is
    /// parsed, whether or not the model uses its column. Cells past an empty
    /// field stay zero.
    pub fn assemble(
        &self,
        table: &Table,
        response: Option<usize>,
    ) -> Result<(Matrix, Option<Matrix>), RegressionError> {
        let n = table.n_rows();
        let mut x = Matrix::zero(n, self.width());
        let mut y = response.map(|_| Matrix::zero(n, 1));

        for (i, row) in table.rows().iter().enumerate() {
            x.set(i, 0, 1.0)?;
            for (j, field) in row.iter().enumerate() {
                if field.is_empty() {
                    log::debug!("Data row {} ends early at column {j}", i + 1);
                    break;
                }

                let column_name = || table.header().get(j).cloned().unwrap_or_default();
                let value: f64 = field.parse().map_err(|_| RegressionError::Parse {
                    row: i + 1,
                    column: column_name(),
                    value: field.clone(),
                })?;
                if !value.is_finite() {
                    return Err(RegressionError::NonFinite {
                        row: i + 1,
                        column: column_name(),
                        value: field.clone(),
                    });
                }

                if let Some(k) = self.columns.iter().position(|&(index, _)| index == j) {
                    x.set(i, k + 1, value)?;
                }
                if let (true, Some(y)) = (response == Some(j), y.as_mut()) {
                    y.set(i, 0, value)?;
                }
            }
        }
        Ok((x, y))
    }
}

/// Fits `formula` to `table` by ordinary least squares.
pub fn fit(
    table: &Table,
    formula: &Formula,
    config: &LinalgConfig,
) -> Result<RegressionModel, RegressionError> {
    let response = table
        .column_positions()
        .get(formula.dependent.as_str())
        .copied()
        .ok_or_else(|| RegressionError::ColumnNotFound(formula.dependent.clone()))?;
    let layout = DesignLayout::new(table, &formula.independent)?;

    log::info!(
        "Fitting '{}' on {} explanatory variables over {} observations",
        formula.dependent,
        layout.columns.len(),
        table.n_rows()
    );

    let (x, y) = layout.assemble(table, Some(response))?;
    let y = y.unwrap_or_else(|| Matrix::zero(table.n_rows(), 1));
    let (coef, fitted) = normal_equations(&x, &y, config)?;

    Ok(RegressionModel::new(
        formula.dependent.clone(),
        layout.names(),
        fitted,
        coef,
    ))
}

/// Solves `coef = (XᵀX)⁻¹Xᵀy` and the fitted values `X(XᵀX)⁻¹Xᵀy`.
pub fn normal_equations(
    x: &Matrix,
    y: &Matrix,
    config: &LinalgConfig,
) -> Result<(Matrix, Matrix), MatrixError> {
    let reducer = RowReducer::new(*config);
    let fuzz = config.fuzz;

    let xt = x.transpose();
    let xtx = xt.multiply_with(x, fuzz)?;
    log::debug!(
        "XtX is {}x{} with {} stored entries",
        xtx.rows(),
        xtx.cols(),
        xtx.nnz()
    );
    let xtx_inv = reducer.inverse(&xtx)?;
    let xtx_inv_xt = xtx_inv.multiply_with(&xt, fuzz)?;

    let coef = xtx_inv_xt.multiply_with(y, fuzz)?;
    let hat = x.multiply_with(&xtx_inv_xt, fuzz)?;
    let fitted = hat.multiply_with(y, fuzz)?;
    Ok((coef, fitted))
}
