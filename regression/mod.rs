//! # Regression Layer
//!
//! Thin glue around the matrix engine: table reading, formula resolution, the
//! least-squares driver, model persistence and text output.

pub mod formula;
pub mod model;
pub mod ols;
pub mod report;
pub mod table;

pub use formula::{Formula, FormulaError};
pub use model::{ModelError, RegressionModel, SavedModel};
pub use ols::{RegressionError, fit};
pub use table::{Table, TableError, read_table};
