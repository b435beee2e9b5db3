//! The annotation pipeline.
//!
//! A run owns a timestamped working folder under `annotation_runs/`. The
//! scanner walks the input tree and dispatches eligible files to the handler,
//! which extracts archives, samples tables, drives the annotator, and
//! persists one `<stem>.analysis.json` artifact per analyzed table. The
//! accumulated summary table is written once, at the end, as
//! `analysis_summary.csv` inside the run folder.
//!
//! ```no_run
//! use tablescribe::ai::OpenAiChat;
//! use tablescribe::annotate::Annotator;
//! use tablescribe::config::GenerationConfig;
//! use tablescribe::pipeline::{DirectoryScanner, FileHandler, create_run_folder};
//! use std::path::Path;
//!
//! # async fn example() -> tablescribe::error::Result<()> {
//! let config = GenerationConfig::from_env();
//! let run_folder = create_run_folder(Path::new("annotation_runs"))?;
//!
//! let annotator = Annotator::new(OpenAiChat::from_env(config.clone()), config.clone());
//! let handler = FileHandler::new(annotator, run_folder.clone(), config.sample_rows);
//! let scanner = DirectoryScanner::new(handler);
//!
//! let table = scanner.scan(Path::new("hospital_data")).await?;
//! table.write_csv(&run_folder.join("analysis_summary.csv"))?;
//! # Ok(())
//! # }
//! ```

pub mod handler;
pub mod scanner;
pub mod summary;

pub use handler::FileHandler;
pub use scanner::DirectoryScanner;
pub use summary::{FileKind, SummaryRecord, SummaryTable};

use crate::error::{Result, ResultExt as _};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Name of the summary CSV written at the end of every run.
pub const SUMMARY_FILENAME: &str = "analysis_summary.csv";

/// Create a timestamped working folder for one annotation run.
///
/// Layout: `<base>/annotation_run_<YYYYMMDD_HHMM>/`.
pub fn create_run_folder(base: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M");
    let run_folder = base.join(format!("annotation_run_{timestamp}"));

    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create run folder: {}", run_folder.display()))?;

    tracing::info!("Created annotation run folder: {}", run_folder.display());
    Ok(run_folder)
}
