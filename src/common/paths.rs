//! Configuration and data paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/vindicator/`, `~/.local/share/vindicator/`
//! - macOS: `~/Library/Application Support/vindicator/`
//! - Windows: `%APPDATA%\vindicator\`

use std::path::PathBuf;

/// Name used for the config and data directories
const APP_NAME: &str = "vindicator";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("logs"))
}

/// Default directory for saved test results
pub fn results_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("results"))
}
