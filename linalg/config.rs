use serde::{Deserialize, Serialize};

/// Magnitude below which a computed value is treated as exactly zero.
pub const DEFAULT_FUZZ: f64 = 1e-14;

/// How elementary row operations are carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowOpStrategy {
    /// Build the elementary matrix and left-multiply it onto the target.
    /// O(n^3) per operation, but every transform is a single `multiply`.
    #[default]
    Elementary,
    /// Mutate the affected rows of a copy in place. Agrees with `Elementary`
    /// within the fuzz tolerance.
    Direct,
}

/// Numerical settings threaded through every cleanup and comparison call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinalgConfig {
    pub fuzz: f64,
    pub row_ops: RowOpStrategy,
}

impl Default for LinalgConfig {
    fn default() -> Self {
        Self {
            fuzz: DEFAULT_FUZZ,
            row_ops: RowOpStrategy::default(),
        }
    }
}

impl LinalgConfig {
    pub fn with_row_ops(mut self, row_ops: RowOpStrategy) -> Self {
        self.row_ops = row_ops;
        self
    }

    pub fn with_fuzz(mut self, fuzz: f64) -> Self {
        self.fuzz = fuzz;
        self
    }
}
