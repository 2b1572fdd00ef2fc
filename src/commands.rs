//! CLI command definitions
//!
//! Defines the clap commands for the vindicator CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a test plan against a device
    Run {
        /// Path to the YAML (or .json) test plan
        plan: PathBuf,

        /// Serial port of the device (default: defaults.port from config)
        #[arg(long, short)]
        port: Option<String>,

        /// Baud rate (default: serial.baud_rate from config)
        #[arg(long)]
        baud: Option<u32>,

        /// Use a scripted device that answers every status read with OK
        #[arg(long)]
        dry_run: bool,

        /// Save the results when the run finishes
        #[arg(long, short)]
        save: bool,

        /// Print the final run state as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Send a single command line to a device
    Send {
        /// Command text; CR LF is appended
        data: String,

        /// Serial port of the device (default: defaults.port from config)
        #[arg(long, short)]
        port: Option<String>,

        /// Baud rate (default: serial.baud_rate from config)
        #[arg(long)]
        baud: Option<u32>,

        /// Read and print the device status afterwards
        #[arg(long, short)]
        read: bool,
    },

    /// List available serial ports
    #[command(alias = "ls")]
    Ports,

    /// Show application information
    Info,
}
