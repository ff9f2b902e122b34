//! # Table Reading
//!
//! Reads a delimited text file into a header row plus data rows of raw string
//! fields. Nothing is interpreted here; numeric parsing belongs to the
//! regression engine so that a bad cell is reported with its column name.
//!
//! Data rows may be shorter than the header. The engine stops reading a row at
//! its first empty field.

use std::path::Path;

use ahash::AHashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to read the input table: {0}")]
    Csv(#[from] csv::Error),
    #[error("The input table '{0}' is empty; a header row with column names is required.")]
    MissingHeader(String),
}

/// A header plus string-valued data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Splits `records` into the header (first record) and data rows.
    pub fn from_records(records: Vec<Vec<String>>) -> Option<Self> {
        let mut records = records.into_iter();
        let header = records.next()?;
        Some(Self {
            header,
            rows: records.collect(),
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Maps each column name to its first position in the header.
    pub fn column_positions(&self) -> AHashMap<&str, usize> {
        let mut positions = AHashMap::with_capacity(self.header.len());
        for (index, name) in self.header.iter().enumerate() {
            positions.entry(name.as_str()).or_insert(index);
        }
        positions
    }
}

/// Picks a field delimiter from the file extension: tab for `.tsv`/`.tab`,
/// comma otherwise.
pub fn infer_delimiter(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
        _ => b',',
    }
}

/// Reads `path` into a [`Table`]. When `delimiter` is `None` it is inferred
/// from the extension.
pub fn read_table(path: &Path, delimiter: Option<u8>) -> Result<Table, TableError> {
    let delimiter = delimiter.unwrap_or_else(|| infer_delimiter(path));
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_path(path)?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_owned).collect::<Vec<_>>());
    }

    let table = Table::from_records(records)
        .ok_or_else(|| TableError::MissingHeader(path.display().to_string()))?;
    log::debug!(
        "Read {} data rows with {} columns from {}",
        table.n_rows(),
        table.header().len(),
        path.display()
    );
    Ok(table)
}
