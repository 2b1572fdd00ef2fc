//! Vindicator test runner
//!
//! Drives step-by-step command plans against a device on a serial line
//! and records the status it reports.

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use vindicator::common::config::Config;
use vindicator::common::logging;
use vindicator::{cli, commands};

#[derive(Parser)]
#[command(name = "vindicator", about = "Serial test runner for Vindicator devices")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write the log to the data directory
    #[arg(long, global = true)]
    log_file: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Keep the file writer alive until exit
    let _log_guard = if cli.log_file {
        logging::init_with_file(cli.verbose).map(|(path, guard)| {
            tracing::debug!(path = %path.display(), "Logging to file");
            guard
        })
    } else {
        logging::init_cli(cli.verbose);
        None
    };

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let result = match config {
        Ok(config) => cli::dispatch(cli.command, &config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
