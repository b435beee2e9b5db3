//! Tablescribe command-line entry point.
//!
//! Loads `.env`, initializes logging, parses the subcommand, and runs it on
//! a Tokio runtime. Any error propagating out of a command handler exits
//! with status 1, which is how fatal configuration errors (missing
//! credential, missing input directory, missing `Filename` column) surface.

mod cli;

use clap::Parser as _;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load OPENAI_API_KEY and friends from .env when present
    dotenvy::dotenv().ok();

    let _log_guard = tablescribe::logging::init()?;

    let cli = cli::Cli::parse();

    tokio::runtime::Runtime::new()?.block_on(cli::run_command(cli.command))?;
    Ok(())
}
