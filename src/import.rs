//! Bulk CSV-to-SQLite import.
//!
//! Straight load, no transformation: every `.csv` file in a flat directory
//! becomes one table named by the file stem, every cell typed TEXT, existing
//! tables replaced. One file's failure is logged and the batch continues.

use crate::error::{Result, ResultExt as _, ScribeError};
use rusqlite::Connection;
use std::path::Path;

/// Outcome of one import run.
#[derive(Debug)]
pub struct ImportReport {
    pub tables_imported: usize,
    pub files_failed: usize,
}

/// Import every CSV in `csv_dir` (non-recursive) into the SQLite database at
/// `db_path`, creating it if needed.
pub fn import_directory(csv_dir: &Path, db_path: &Path) -> Result<ImportReport> {
    if !csv_dir.is_dir() {
        return Err(ScribeError::InvalidPath(format!(
            "not a directory: {}",
            csv_dir.display()
        )));
    }

    let mut conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let mut entries: Vec<_> = std::fs::read_dir(csv_dir)
        .with_context(|| format!("Failed to read directory: {}", csv_dir.display()))?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .and_then(|x| x.to_str())
                    .is_some_and(|x| x.eq_ignore_ascii_case("csv"))
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut report = ImportReport {
        tables_imported: 0,
        files_failed: 0,
    };

    for entry in entries {
        let path = entry.path();
        let table_name = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::info!("Importing {} into table: {table_name}", path.display());

        match import_table(&mut conn, &path, &table_name) {
            Ok(rows) => {
                tracing::info!("Imported table {table_name} ({rows} rows)");
                report.tables_imported += 1;
            }
            Err(e) => {
                tracing::error!("Failed to import {}: {e}", path.display());
                report.files_failed += 1;
            }
        }
    }

    Ok(report)
}

/// Load one CSV into one table, all cells TEXT, replacing any existing
/// table of the same name.
fn import_table(conn: &mut Connection, csv_path: &Path, table_name: &str) -> Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to read CSV: {}", csv_path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(str::to_owned)
        .collect();
    if headers.is_empty() {
        return Err(ScribeError::Table(format!(
            "no columns in {}",
            csv_path.display()
        )));
    }

    let quoted_table = quote_ident(table_name);
    let column_defs = headers
        .iter()
        .map(|h| format!("{} TEXT", quote_ident(h)))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; headers.len()].join(", ");

    let tx = conn.transaction()?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {quoted_table}; CREATE TABLE {quoted_table} ({column_defs});"
    ))?;

    let mut rows = 0;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {quoted_table} VALUES ({placeholders})"
        ))?;
        for record in reader.records() {
            let record = record.context("Failed to read CSV row")?;
            let mut values: Vec<String> = record.iter().map(str::to_owned).collect();
            values.resize(headers.len(), String::new());
            stmt.execute(rusqlite::params_from_iter(values.iter()))?;
            rows += 1;
        }
    }
    tx.commit()?;

    Ok(rows)
}

/// Double-quote an identifier for SQLite, escaping embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
