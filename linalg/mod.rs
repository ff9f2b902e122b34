//! # Sparse Linear Algebra Engine
//!
//! A deliberately small engine: one sparse `Matrix` type, three elementary row
//! operations, and the elimination, inversion and determinant algorithms
//! composed from them. Numerical settings live in [`LinalgConfig`] and travel
//! with a [`RowReducer`] rather than in global state.

pub mod config;
pub mod elimination;
pub mod error;
pub mod inverse;
pub mod matrix;
pub mod properties;
pub mod row_ops;

pub use config::{DEFAULT_FUZZ, LinalgConfig, RowOpStrategy};
pub use elimination::{Echelon, gaussian_elimination};
pub use error::MatrixError;
pub use inverse::inverse;
pub use matrix::Matrix;
pub use properties::{determinant, is_diagonal, is_lower_triangular, is_upper_triangular};
pub use row_ops::{RowReducer, add_to_row, scale_row, swap_rows};
