use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablescribe::ai::OpenAiChat;
use tablescribe::annotate::Annotator;
use tablescribe::config::{API_KEY_VAR, GenerationConfig};
use tablescribe::pipeline::{DirectoryScanner, FileHandler, SUMMARY_FILENAME, create_run_folder};

#[derive(Parser)]
#[command(name = "tablescribe", about = "AI annotation for tabular clinical data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory of CSV / gzipped files and annotate every table
    Annotate {
        /// Directory containing data files
        directory: PathBuf,

        /// Base directory for run folders
        #[arg(long, default_value = "annotation_runs")]
        runs_dir: PathBuf,
    },
    /// Merge analysis artifacts into an existing summary CSV
    Merge {
        /// Directory containing .analysis.json artifacts
        directory: PathBuf,

        /// CSV file to update (must have a 'Filename' column)
        csv_path: PathBuf,

        /// Path where the updated CSV will be saved
        output_path: PathBuf,
    },
    /// Import a directory of CSV files into a SQLite database
    Import {
        /// Directory containing CSV files
        directory: PathBuf,

        /// SQLite database path (created if absent)
        #[arg(short, long, default_value = "tablescribe.db")]
        database: PathBuf,
    },
}

pub async fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Annotate {
            directory,
            runs_dir,
        } => handle_annotate(directory, runs_dir).await,
        Commands::Merge {
            directory,
            csv_path,
            output_path,
        } => handle_merge(directory, csv_path, output_path),
        Commands::Import {
            directory,
            database,
        } => handle_import(directory, database),
    }
}

async fn handle_annotate(directory: PathBuf, runs_dir: PathBuf) -> Result<()> {
    let api_key = std::env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty());
    let Some(api_key) = api_key else {
        anyhow::bail!(
            "{API_KEY_VAR} environment variable is not set. \
             Set it in your .env file or export it with: export {API_KEY_VAR}='your-api-key'"
        );
    };

    let config = GenerationConfig::from_env();
    let run_folder = create_run_folder(&runs_dir)?;

    let annotator = Annotator::new(OpenAiChat::new(api_key, config.clone()), config.clone());
    let handler = FileHandler::new(annotator, run_folder.clone(), config.sample_rows);
    let scanner = DirectoryScanner::new(handler);

    let table = scanner
        .scan(&directory)
        .await
        .context("Directory scan failed")?;

    let summary_path = run_folder.join(SUMMARY_FILENAME);
    table.write_csv(&summary_path)?;

    println!("\nSummary: Processed {} files", table.analyzed_count());
    println!("Results saved to: {}", run_folder.display());
    println!("Summary CSV: {}", summary_path.display());
    Ok(())
}

fn handle_merge(directory: PathBuf, csv_path: PathBuf, output_path: PathBuf) -> Result<()> {
    let report = tablescribe::merge::merge_artifacts(&directory, &csv_path, &output_path)?;

    println!(
        "Found {} artifacts, updated {} rows",
        report.artifacts_found, report.rows_updated
    );
    println!("Updated CSV saved to: {}", output_path.display());
    Ok(())
}

fn handle_import(directory: PathBuf, database: PathBuf) -> Result<()> {
    let report = tablescribe::import::import_directory(&directory, &database)?;

    println!(
        "Imported {} tables ({} failed)",
        report.tables_imported, report.files_failed
    );
    println!("Database saved to: {}", database.display());
    Ok(())
}
