//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;

use crate::backend::{list_ports, Backend, ResultStore, ScriptedBackend, SerialBackend};
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Result};
use crate::metadata::METADATA;
use crate::testing::{Outcome, TestCommand, TestExecutor, TestPlan};

/// Device name used for dry runs without a port
const DRY_RUN_DEVICE: &str = "dry-run";

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run {
            plan,
            port,
            baud,
            dry_run,
            save,
            json,
        } => run_plan(&plan, port, baud, dry_run, save, json, config).await,

        Commands::Send {
            data,
            port,
            baud,
            read,
        } => {
            let device = config.resolve_port(port)?;
            let backend = serial_backend(config, baud)?;
            let line = TestCommand::new(data, "").line();

            backend.write_to_port(&device, &line).await?;
            println!("Sent {} to {}", line.trim_end().bold(), device);

            if read {
                let status = backend.read_device_status(&device).await?;
                println!("{}", status);
            }

            Ok(())
        }

        Commands::Ports => {
            let ports = list_ports()?;
            if ports.is_empty() {
                println!("No serial ports found.");
            } else {
                println!("Available serial ports:");
                for port in &ports {
                    println!("  {}  {}", port.name.bold(), port.kind.dimmed());
                }
            }
            Ok(())
        }

        Commands::Info => {
            println!("{}", METADATA.name.bold());
            println!("  Author:  {}", METADATA.author);
            println!("  Repo:    {}", METADATA.repo);
            for (label, url) in METADATA.references() {
                println!("  {:<8} {}", format!("{}:", label), url);
            }
            if let Some(path) = paths::config_path() {
                println!("  Config:  {}", path.display().to_string().dimmed());
            }
            if let Ok(dir) = config.results_dir() {
                println!("  Results: {}", dir.display().to_string().dimmed());
            }
            Ok(())
        }
    }
}

fn serial_backend(config: &Config, baud: Option<u32>) -> Result<SerialBackend> {
    let mut settings = config.serial.clone();
    if let Some(baud) = baud {
        settings.baud_rate = baud;
    }
    Ok(SerialBackend::new(
        settings,
        ResultStore::new(config.results_dir()?),
    ))
}

async fn run_plan(
    path: &Path,
    port: Option<String>,
    baud: Option<u32>,
    dry_run: bool,
    save: bool,
    json: bool,
    config: &Config,
) -> Result<()> {
    let plan = TestPlan::load(path)?;

    let device = if dry_run {
        port.or_else(|| config.defaults.port.clone())
            .unwrap_or_else(|| DRY_RUN_DEVICE.to_string())
    } else {
        config.resolve_port(port)?
    };
    let backend: Arc<dyn Backend> = if dry_run {
        Arc::new(ScriptedBackend::new())
    } else {
        Arc::new(serial_backend(config, baud)?)
    };

    let executor = TestExecutor::new(device, plan, backend)?;

    if !json {
        let name = executor
            .plan()
            .name
            .clone()
            .unwrap_or_else(|| path.display().to_string());
        println!("\n{} {}", "Running Test:".blue().bold(), name.white().bold());
        println!("  Device: {}", executor.device().dimmed());
        if dry_run {
            println!("  {}", "Dry run: no device is contacted".yellow());
        }
    }

    executor.start().await;

    let saved = if save {
        executor.save_results().await
    } else {
        None
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&executor.snapshot())?);
        return Ok(());
    }

    print_report(&executor);

    if save {
        match saved {
            Some(location) => println!("Results saved to {}", location.bold()),
            None => println!("{} Results could not be saved; see the log", "!".yellow().bold()),
        }
    }

    Ok(())
}

fn print_report(executor: &TestExecutor) {
    let plan = executor.plan();
    let snapshot = executor.snapshot();
    let mut results = snapshot.results.iter();
    let mut current_step = None;

    println!("\n{}", "Steps:".cyan());
    for outcome in &snapshot.outcomes {
        let step_index = outcome.cursor.step_index;
        if current_step != Some(step_index) {
            current_step = Some(step_index);
            let description = plan
                .steps
                .get(step_index)
                .map(|s| s.description.as_str())
                .unwrap_or("");
            println!("  Step {}: {}", step_index + 1, description.white().bold());
        }

        match &outcome.outcome {
            Outcome::Success => {
                let reads = plan
                    .command_at(outcome.cursor)
                    .map(|c| c.execute_read_after)
                    .unwrap_or(false);
                let record = if reads { results.next() } else { None };
                match record {
                    Some(record) => println!(
                        "    {} {} -> {}",
                        "✓".green(),
                        outcome.command,
                        record.result.dimmed()
                    ),
                    None => println!("    {} {}", "✓".green(), outcome.command),
                }
            }
            Outcome::Failed(reason) => {
                println!("    {} {}: {}", "✗".red(), outcome.command, reason)
            }
        }
    }

    let failed = snapshot
        .outcomes
        .iter()
        .filter(|o| !o.outcome.is_success())
        .count();
    let total = snapshot.outcomes.len();

    if failed == 0 {
        println!(
            "\n{} {} ({} commands, {} results)\n",
            "✓".green().bold(),
            "Test Finished".green().bold(),
            total,
            snapshot.results.len()
        );
    } else {
        println!(
            "\n{} {} ({} of {} commands failed, {} results)\n",
            "✗".red().bold(),
            "Test Finished With Errors".red().bold(),
            failed,
            total,
            snapshot.results.len()
        );
    }
}
