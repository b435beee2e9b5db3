//! Recursive directory scan.
//!
//! Walks the input tree in a stable order, dispatches every eligible file to
//! the handler, and folds the returned records into one summary table.
//! Strictly sequential: one file is fully processed (both generation calls
//! included) before the next begins, which is what keeps the table's
//! append-order invariant trivial.

use crate::ai::ChatService;
use crate::error::{Result, ScribeError};
use crate::pipeline::handler::{FileHandler, has_extension};
use crate::pipeline::summary::SummaryTable;
use std::path::Path;
use walkdir::WalkDir;

/// Drives one scan over an input directory.
pub struct DirectoryScanner<S> {
    handler: FileHandler<S>,
}

impl<S: ChatService> DirectoryScanner<S> {
    pub fn new(handler: FileHandler<S>) -> Self {
        Self { handler }
    }

    /// Recursively scan `root` and return the accumulated summary table.
    ///
    /// Files ending in `.gz` or `.csv` (case-insensitive) are dispatched;
    /// everything else is silently skipped. Traversal is sorted by file name
    /// at every level so the same tree always yields the same record order.
    pub async fn scan(&self, root: &Path) -> Result<SummaryTable> {
        if !root.is_dir() {
            return Err(ScribeError::InvalidPath(format!(
                "not a directory: {}",
                root.display()
            )));
        }

        tracing::info!("Scanning directory: {}", root.display());

        let mut table = SummaryTable::new();

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();

            let record = if has_extension(path, "gz") {
                self.handler.handle_archive(path).await
            } else if has_extension(path, "csv") {
                self.handler.handle_table(path, None).await
            } else {
                continue;
            };

            table.push(record);
        }

        Ok(table)
    }
}
