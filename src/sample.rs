//! Data sample extraction.
//!
//! A [`DataSample`] is the model's context-window substitute for a full
//! table: the header plus a fixed-size prefix of rows, rendered once as a
//! text block that both generation stages consume. Every cell is loaded as
//! text; no schema inference, no validation.

use crate::error::{Result, ResultExt as _};
use polars::prelude::*;
use std::path::Path;

/// Header plus a fixed-size row prefix of one table.
///
/// Built once per table, immutable, and never escapes past the annotator.
#[derive(Debug, Clone)]
pub struct DataSample {
    pub filename: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub rendered: String,
}

impl DataSample {
    /// Load a CSV as all-text cells and sample its header and first
    /// `max_rows` rows.
    pub fn from_csv(path: &Path, max_rows: usize) -> Result<Self> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Schema inference disabled: every column reads as a string.
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_n_rows(Some(max_rows))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to open CSV: {}", path.display()))?
            .finish()
            .with_context(|| format!("Failed to read CSV: {}", path.display()))?;

        let header: Vec<String> = df
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut columns: Vec<Vec<String>> = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let ca = series.str()?;
            columns.push(
                ca.into_iter()
                    .map(|v| v.unwrap_or("").to_owned())
                    .collect(),
            );
        }

        let height = df.height();
        let mut rows = Vec::with_capacity(height);
        for i in 0..height {
            rows.push(columns.iter().map(|c| c[i].clone()).collect());
        }

        let rendered = render_sample(&header, &rows);

        Ok(Self {
            filename,
            header,
            rows,
            rendered,
        })
    }
}

/// Render the sample as the text block sent to the generation service:
/// the header list followed by the row prefix in aligned columns.
fn render_sample(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(cell.len());
                format!("{cell:>w$}")
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = format!("Header: [{}]\n\n", header.join(", "));
    out.push_str(&format!("First {} rows:\n", rows.len()));
    out.push_str(&format_row(header));
    for row in rows {
        out.push('\n');
        out.push_str(&format_row(row));
    }
    out
}
