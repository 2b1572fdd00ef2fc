//! Logging and tracing configuration
//!
//! Logs go to stderr so stdout stays clean for run reports. A run can
//! additionally be logged to a file in the data directory.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::paths;

/// File name of the run log inside the log directory
const LOG_FILE: &str = "vindicator.log";

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("vindicator=debug,warn")
        } else {
            EnvFilter::new("vindicator=info,warn")
        }
    })
}

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate (DEBUG with `verbose`), WARN for dependencies.
pub fn init_cli(verbose: bool) {
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

/// Initialize tracing to stderr plus `<data dir>/logs/vindicator.log`
///
/// The returned guard flushes the file writer when dropped, so keep it
/// alive for the whole process. Falls back to stderr only when the log
/// directory cannot be created.
pub fn init_with_file(verbose: bool) -> Option<(PathBuf, WorkerGuard)> {
    let Some(log_dir) = paths::log_dir() else {
        init_cli(verbose);
        return None;
    };
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_cli(verbose);
        return None;
    }

    let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Some((log_dir.join(LOG_FILE), guard))
}
