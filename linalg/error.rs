use thiserror::Error;

/// Every failure the matrix engine can report.
///
/// Floating round-off is never surfaced here; it is absorbed by fuzz cleanup
/// and fuzz equality inside the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Dimension mismatch in {op}: left operand is {left:?}, right operand is {right:?}.")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("{op} requires a square matrix, but the input is {rows}x{cols}.")]
    NonSquare {
        op: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("Matrix is singular: {reason}.")]
    Singular { reason: &'static str },

    #[error("Coordinate ({row}, {col}) is out of range for a {rows}x{cols} matrix.")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Row {row} is out of range for a matrix with {rows} rows.")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("Row {row} has {found} values, but the first row has {expected}.")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}
