//! # Tablescribe - Clinical Table Annotation Pipeline
//!
//! Tablescribe walks directories of tabular clinical data (CSV files, plain
//! or gzipped), samples each table, and drives a two-stage chat-completion
//! protocol to produce a natural-language description plus administrative /
//! research / clinical question sets per table. Per-file results are
//! persisted as JSON artifacts and folded into one summary CSV per run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tablescribe::ai::OpenAiChat;
//! use tablescribe::annotate::Annotator;
//! use tablescribe::config::GenerationConfig;
//! use tablescribe::sample::DataSample;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GenerationConfig::from_env();
//! let annotator = Annotator::new(OpenAiChat::from_env(config.clone()), config.clone());
//!
//! let sample = DataSample::from_csv(Path::new("admissions.csv"), config.sample_rows)?;
//! let result = annotator.annotate(&sample).await;
//! println!("{}", result.description);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`pipeline`]: directory scan, per-file handling, summary table
//! - [`annotate`]: the two-stage generation protocol and response parser
//! - [`ai`]: chat-completion client behind the [`ai::ChatService`] seam
//! - [`sample`]: all-text table sampling
//! - [`merge`]: post-hoc artifact-to-CSV merge utility
//! - [`import`]: bulk CSV-to-SQLite load
//!
//! ## Failure policy
//!
//! A single malformed file or flaky generation call must never abort a
//! multi-hundred-file scan. Transport failures become error-marker strings,
//! unparseable responses become empty question lists with the raw text
//! preserved, and per-file I/O errors become `CSV (Error)` summary records.
//! Only configuration errors (missing credential, missing input directory,
//! missing `Filename` column in the merge utility) are fatal.

pub mod ai;
pub mod annotate;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod sample;
