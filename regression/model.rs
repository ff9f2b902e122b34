use std::fs;
use std::io::{BufWriter, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ols::{DesignLayout, RegressionError};
use super::table::Table;
use crate::linalg::{LinalgConfig, Matrix};

/// Label used for design column 0.
pub const INTERCEPT_LABEL: &str = "(Intercept)";

/// The outcome of one least-squares fit. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionModel {
    dependent: String,
    independent: Vec<String>,
    fitted: Matrix,
    coef: Matrix,
}

impl RegressionModel {
    pub(crate) fn new(
        dependent: String,
        independent: Vec<String>,
        fitted: Matrix,
        coef: Matrix,
    ) -> Self {
        Self {
            dependent,
            independent,
            fitted,
            coef,
        }
    }

    pub fn dependent(&self) -> &str {
        &self.dependent
    }

    /// Explanatory variable names in design-column order (header order).
    pub fn independent(&self) -> &[String] {
        &self.independent
    }

    /// Fitted values, `n x 1`.
    pub fn fitted(&self) -> &Matrix {
        &self.fitted
    }

    /// Coefficients, `(k + 1) x 1`; row 0 is the intercept.
    pub fn coef(&self) -> &Matrix {
        &self.coef
    }

    pub fn n_observations(&self) -> usize {
        self.fitted.rows()
    }

    /// `(term, estimate)` pairs starting with the intercept.
    pub fn terms(&self) -> Vec<(&str, f64)> {
        std::iter::once(INTERCEPT_LABEL)
            .chain(self.independent.iter().map(String::as_str))
            .enumerate()
            .map(|(i, name)| (name, self.coef.get(i, 0)))
            .collect()
    }

    /// Snapshot for persisting the model to disk.
    pub fn to_saved(&self, linalg: LinalgConfig) -> SavedModel {
        SavedModel {
            dependent: self.dependent.clone(),
            independent: self.independent.clone(),
            coefficients: self.coef.column_values(),
            n_observations: self.n_observations(),
            linalg,
        }
    }
}

/// Errors raised while saving, loading or applying a saved model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read or write model file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML model file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize model to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error(
        "Model file holds {found} coefficients, but {expected} are needed for the intercept plus {} explanatory variables.",
        .expected - 1
    )]
    CoefficientCount { found: usize, expected: usize },
    #[error(transparent)]
    Regression(#[from] RegressionError),
}

/// The human-readable model artifact written by `ols fit --save-model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    pub dependent: String,
    pub independent: Vec<String>,
    /// Intercept first, then one entry per name in `independent`.
    pub coefficients: Vec<f64>,
    pub n_observations: usize,
    #[serde(default)]
    pub linalg: LinalgConfig,
}

impl SavedModel {
    pub fn save(&self, path: &str) -> Result<(), ModelError> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<Self, ModelError> {
        let toml_string = fs::read_to_string(path)?;
        let model: Self = toml::from_str(&toml_string)?;
        model.check_shape()?;
        Ok(model)
    }

    fn check_shape(&self) -> Result<(), ModelError> {
        let expected = self.independent.len() + 1;
        if self.coefficients.len() != expected {
            return Err(ModelError::CoefficientCount {
                found: self.coefficients.len(),
                expected,
            });
        }
        Ok(())
    }

    /// Predicted responses (`n x 1`) for the rows of `table`.
    ///
    /// The explanatory columns are located by name, so the new table may order
    /// or extend its columns freely.
    pub fn predict(&self, table: &Table) -> Result<Matrix, ModelError> {
        self.check_shape()?;

        let layout = DesignLayout::new(table, &self.independent)?;
        let truncated = layout.truncated_rows(table);
        if !truncated.is_empty() {
            log::warn!(
                "{} data rows end before every explanatory column is filled (first: row {}); their missing predictors count as zero",
                truncated.len(),
                truncated[0]
            );
        }
        let (x, _) = layout.assemble(table, None)?;

        // Coefficients are stored in the order the model was fitted with;
        // align them with the new table's header order.
        let mut coef = Matrix::zero(layout.width(), 1);
        coef.set(0, 0, self.coefficients[0])
            .map_err(RegressionError::from)?;
        for (k, (_, name)) in layout.columns.iter().enumerate() {
            let stored = self
                .independent
                .iter()
                .position(|candidate| candidate == name)
                .map_or(0.0, |index| self.coefficients[index + 1]);
            coef.set(k + 1, 0, stored).map_err(RegressionError::from)?;
        }

        log::info!(
            "Predicting '{}' for {} rows with {} coefficients",
            self.dependent,
            table.n_rows(),
            self.coefficients.len()
        );
        let predicted = x
            .multiply_with(&coef, self.linalg.fuzz)
            .map_err(RegressionError::from)?;
        Ok(predicted)
    }
}
