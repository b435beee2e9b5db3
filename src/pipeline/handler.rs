//! Per-file processing: the two terminal branches of the scan.
//!
//! An input file is either an archive (gunzip it, recurse if a table falls
//! out) or a table (sample, annotate, persist the artifact). Every path
//! through this module ends in exactly one [`SummaryRecord`]; errors while
//! loading, sampling, or persisting become a `CSV (Error)` record rather
//! than escaping, so one malformed file never aborts the scan.

use crate::ai::ChatService;
use crate::annotate::{AnalysisResult, Annotator};
use crate::error::{Result, ResultExt as _, ScribeError};
use crate::pipeline::summary::{FileKind, SummaryRecord};
use crate::sample::DataSample;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Processes one input file end to end inside a run folder.
pub struct FileHandler<S> {
    annotator: Annotator<S>,
    run_folder: PathBuf,
    sample_rows: usize,
}

impl<S: ChatService> FileHandler<S> {
    pub fn new(annotator: Annotator<S>, run_folder: PathBuf, sample_rows: usize) -> Self {
        Self {
            annotator,
            run_folder,
            sample_rows,
        }
    }

    /// Archive-extraction branch: decompress into the run folder, then
    /// recurse into the table branch if the artifact is a CSV.
    pub async fn handle_archive(&self, gz_path: &Path) -> SummaryRecord {
        tracing::info!("Processing archive: {}", gz_path.display());

        let extracted_name = gz_path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extracted_path = self.run_folder.join(&extracted_name);

        if let Err(e) = extract_gz(gz_path, &extracted_path) {
            tracing::error!("Error extracting {}: {e}", gz_path.display());
            return SummaryRecord::empty(&extracted_name, FileKind::CsvError, gz_path);
        }

        tracing::info!("Extracted to: {}", extracted_path.display());

        if has_extension(&extracted_path, "csv") {
            return self.handle_table(&extracted_path, Some(gz_path)).await;
        }

        // Not an eligible table; record the extraction and stop.
        SummaryRecord::empty(&extracted_name, FileKind::ExtractedNonCsv, gz_path)
    }

    /// Table-processing branch: sample, annotate, persist, summarize.
    ///
    /// `original_path` is set when the table came out of an archive; it
    /// determines the record's kind and source path.
    pub async fn handle_table(&self, csv_path: &Path, original_path: Option<&Path>) -> SummaryRecord {
        tracing::info!("Processing table: {}", csv_path.display());

        let filename = csv_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source_path = original_path.unwrap_or(csv_path).to_path_buf();

        match self.analyze_table(csv_path, original_path).await {
            Ok((result, analysis_path)) => {
                let kind = if original_path.is_some_and(|p| has_extension(p, "gz")) {
                    FileKind::CsvFromArchive
                } else {
                    FileKind::Csv
                };
                SummaryRecord::analyzed(&filename, kind, &source_path, &analysis_path, &result)
            }
            Err(e) => {
                tracing::error!("Error processing table {}: {e}", csv_path.display());
                SummaryRecord::empty(&filename, FileKind::CsvError, &source_path)
            }
        }
    }

    /// The fallible part of the table branch. Everything that can fail is
    /// behind this boundary so the caller can convert it into an error
    /// record.
    async fn analyze_table(
        &self,
        csv_path: &Path,
        original_path: Option<&Path>,
    ) -> Result<(AnalysisResult, PathBuf)> {
        // Keep raw inputs and analysis outputs together: sources that did
        // not originate inside the run folder are copied in.
        let local_path = if original_path.is_none() && !csv_path.starts_with(&self.run_folder) {
            let dest = self.run_folder.join(
                csv_path
                    .file_name()
                    .ok_or_else(|| ScribeError::InvalidPath(csv_path.display().to_string()))?,
            );
            std::fs::copy(csv_path, &dest)
                .with_context(|| format!("Failed to copy {} into run folder", csv_path.display()))?;
            dest
        } else {
            csv_path.to_path_buf()
        };

        let sample = DataSample::from_csv(&local_path, self.sample_rows)?;
        let result = self.annotator.annotate(&sample).await;

        let stem = local_path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let analysis_path = self.run_folder.join(format!("{stem}.analysis.json"));

        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&analysis_path, json)
            .with_context(|| format!("Failed to write {}", analysis_path.display()))?;

        tracing::info!("Analysis saved to: {}", analysis_path.display());

        Ok((result, analysis_path))
    }
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn extract_gz(gz_path: &Path, dest: &Path) -> Result<()> {
    let input = File::open(gz_path)
        .with_context(|| format!("Failed to open archive: {}", gz_path.display()))?;
    let mut decoder = GzDecoder::new(input);
    let mut output = File::create(dest)
        .with_context(|| format!("Failed to create {}", dest.display()))?;
    io::copy(&mut decoder, &mut output)
        .map_err(|e| ScribeError::Archive(format!("{}: {e}", gz_path.display())))?;
    Ok(())
}
