//! Centralized error handling for tablescribe.
//!
//! A single crate-wide error enum keeps the per-file failure policy explicit:
//! file-scoped errors (loading, sampling, persisting) are caught at the
//! handler boundary and turned into summary records, while configuration
//! errors (missing credential, missing `Filename` column) propagate out of
//! the CLI with a nonzero exit.
//!
//! The `From` implementations let the `?` operator lift library errors
//! directly:
//!
//! ```no_run
//! use tablescribe::error::Result;
//! use std::fs;
//!
//! fn read_artifact(path: &str) -> Result<String> {
//!     // std::io::Error converts via From
//!     let content = fs::read_to_string(path)?;
//!     Ok(content)
//! }
//! ```

use std::fmt;

/// Main error type for tablescribe operations.
#[derive(Debug)]
pub enum ScribeError {
    /// I/O errors (file operations, extraction, etc.)
    Io(std::io::Error),

    /// Table loading/sampling errors (Polars, CSV parsing)
    Table(String),

    /// Archive extraction errors
    Archive(String),

    /// Database operation errors (bulk import)
    Database(String),

    /// Configuration errors (missing credential, missing required column)
    Config(String),

    /// File not found or invalid path
    InvalidPath(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for ScribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Table(msg) => write!(f, "Table error: {msg}"),
            Self::Archive(msg) => write!(f, "Archive error: {msg}"),
            Self::Database(msg) => write!(f, "Database error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ScribeError {}

impl From<std::io::Error> for ScribeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for ScribeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for ScribeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for ScribeError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::Table(err.to_string())
    }
}

impl From<csv::Error> for ScribeError {
    fn from(err: csv::Error) -> Self {
        Self::Table(err.to_string())
    }
}

impl From<rusqlite::Error> for ScribeError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for tablescribe operations.
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ScribeError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: ScribeError = e.into();
            ScribeError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: ScribeError = e.into();
            ScribeError::Other(format!("{}: {}", f(), err))
        })
    }
}
