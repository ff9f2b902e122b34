//! Text rendering of fitted models and TSV output of per-row values.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;

use super::model::RegressionModel;
use crate::linalg::Matrix;

/// Renders the coefficient table, one term per line, names left-aligned.
pub fn render_coefficients(model: &RegressionModel) -> String {
    let terms = model.terms();
    let width = terms
        .iter()
        .map(|(name, _)| name.len())
        .chain(std::iter::once("term".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "Response: {} ({} observations)\n",
        model.dependent(),
        model.n_observations()
    );
    out.push_str(&format!("{:<width$}  estimate\n", "term"));
    for (name, estimate) in terms {
        out.push_str(&format!("{name:<width$}  {estimate:.6}\n"));
    }
    out
}

/// Renders a column vector as `row<TAB>value` lines with a header.
pub fn render_column(label: &str, values: &Matrix) -> String {
    let mut buffer = ryu::Buffer::new();
    std::iter::once(format!("row\t{label}"))
        .chain(
            values
                .column_values()
                .into_iter()
                .enumerate()
                .map(|(i, value)| format!("{}\t{}", i + 1, buffer.format(value))),
        )
        .join("\n")
        + "\n"
}

/// Writes `values` as a two-column TSV (`row`, `label`).
///
/// The file is written to a sibling temporary path and renamed into place so
/// a failed write never leaves a truncated file behind.
pub fn write_column_tsv(path: &Path, label: &str, values: &Matrix) -> io::Result<()> {
    let temp_path = path.with_extension("tsv.tmp");
    let write_result = (|| -> io::Result<()> {
        let mut writer = BufWriter::new(fs::File::create(&temp_path)?);
        writer.write_all(render_column(label, values).as_bytes())?;
        writer.flush()?;
        let file = writer.into_inner().map_err(io::Error::other)?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    fs::rename(&temp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&temp_path);
    })
}
