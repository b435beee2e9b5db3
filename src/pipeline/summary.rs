//! Summary records and the run summary table.
//!
//! One record per processed input file, success or not; the table is an
//! append-only sequence in discovery order and is written to CSV exactly once
//! at the end of a run.

use crate::annotate::AnalysisResult;
use crate::error::{Result, ResultExt as _};
use chrono::Local;
use std::path::Path;

/// Sentinel for fields that do not apply to a record.
pub const NOT_APPLICABLE: &str = "N/A";

/// Terminal classification of one processed input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A plain CSV table, analyzed.
    Csv,
    /// A CSV extracted from a gzip archive, analyzed.
    CsvFromArchive,
    /// An archive whose contents were not an eligible table.
    ExtractedNonCsv,
    /// A table that failed to load, sample, or persist.
    CsvError,
}

impl FileKind {
    /// Label used in the summary CSV.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::CsvFromArchive => "CSV from GZ",
            Self::ExtractedNonCsv => "Extracted from GZ",
            Self::CsvError => "CSV (Error)",
        }
    }
}

/// One row of the final summary table.
///
/// Created exactly once per input file by the file handler, appended by the
/// scanner, never mutated afterward.
#[derive(Debug, Clone)]
pub struct SummaryRecord {
    pub filename: String,
    pub kind: FileKind,
    pub source_path: String,
    /// Path to the `.analysis.json` artifact, or "N/A".
    pub analysis_path: String,
    pub timestamp: String,
    pub description: String,
    pub administrative_questions: String,
    pub research_questions: String,
    pub clinical_questions: String,
    pub full_description: String,
    /// Sum of the three category lengths; `None` renders as "N/A".
    pub question_count: Option<usize>,
}

impl SummaryRecord {
    fn timestamp_now() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Record for a successfully analyzed table.
    pub fn analyzed(
        filename: &str,
        kind: FileKind,
        source_path: &Path,
        analysis_path: &Path,
        result: &AnalysisResult,
    ) -> Self {
        Self {
            filename: filename.to_owned(),
            kind,
            source_path: source_path.display().to_string(),
            analysis_path: analysis_path.display().to_string(),
            timestamp: Self::timestamp_now(),
            description: result.description.clone(),
            administrative_questions: bullet_block(&result.administrative_questions),
            research_questions: bullet_block(&result.research_questions),
            clinical_questions: bullet_block(&result.clinical_questions),
            full_description: result.description.clone(),
            question_count: Some(result.question_count()),
        }
    }

    /// Record for a file with no analysis content (extraction-only or error).
    pub fn empty(filename: &str, kind: FileKind, source_path: &Path) -> Self {
        Self {
            filename: filename.to_owned(),
            kind,
            source_path: source_path.display().to_string(),
            analysis_path: NOT_APPLICABLE.to_owned(),
            timestamp: Self::timestamp_now(),
            description: String::new(),
            administrative_questions: String::new(),
            research_questions: String::new(),
            clinical_questions: String::new(),
            full_description: String::new(),
            question_count: Some(0),
        }
    }

    fn count_field(&self) -> String {
        self.question_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| NOT_APPLICABLE.to_owned())
    }
}

fn bullet_block(questions: &[String]) -> String {
    questions
        .iter()
        .map(|q| format!("- {q}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append-only sequence of summary records, insertion order = discovery
/// order during the directory walk.
#[derive(Debug, Default)]
pub struct SummaryTable {
    records: Vec<SummaryRecord>,
}

impl SummaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: SummaryRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[SummaryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records that carry an analysis (kinds CSV / CSV from GZ).
    pub fn analyzed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.kind, FileKind::Csv | FileKind::CsvFromArchive))
            .count()
    }

    /// Write the table as `analysis_summary.csv`-style output, one row per
    /// record, in insertion order.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create summary CSV: {}", path.display()))?;

        writer.write_record(COLUMNS).context("Failed to write summary header")?;

        for record in &self.records {
            writer
                .write_record([
                    record.filename.as_str(),
                    record.kind.label(),
                    record.source_path.as_str(),
                    record.analysis_path.as_str(),
                    record.timestamp.as_str(),
                    record.description.as_str(),
                    record.administrative_questions.as_str(),
                    record.research_questions.as_str(),
                    record.clinical_questions.as_str(),
                    record.full_description.as_str(),
                    record.count_field().as_str(),
                ])
                .context("Failed to write summary row")?;
        }

        writer.flush().context("Failed to flush summary CSV")?;
        Ok(())
    }
}

/// Summary CSV column set, matching the merge utility's expectations.
pub const COLUMNS: [&str; 11] = [
    "Filename",
    "File Type",
    "File Path",
    "Analysis JSON Path",
    "Timestamp",
    "Description",
    "Administrative_Questions",
    "Research_Questions",
    "Clinical_Questions",
    "Full_Description",
    "Number of Questions",
];
