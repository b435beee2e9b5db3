//! Logging infrastructure for tablescribe.
//!
//! Structured logging via `tracing`, written to both the console and a
//! daily-rotating file in the platform data directory. Per-file progress and
//! error lines during a scan go through these macros; the final summary is
//! printed by the binary itself.

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/tablescribe/logs`
/// - macOS: `~/Library/Application Support/tablescribe/logs`
/// - Linux: `~/.local/share/tablescribe/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;

    let log_dir = base_dir.join("tablescribe").join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

/// Initializes the logging system with console and file output.
///
/// Log files rotate daily, keeping 10 old files. Defaults to INFO; override
/// with `RUST_LOG`.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the file appender
/// fails to build.
pub fn init() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = get_log_dir()?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("tablescribe")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create log file appender")?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .without_time()
        .compact();

    let file_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer.boxed())
        .with(file_layer.boxed())
        .init();

    tracing::debug!("Logging initialized, log directory: {:?}", log_dir);

    Ok(guard)
}
