//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::{config_path, results_dir};
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Serial line settings
    #[serde(default)]
    pub serial: SerialConfig,

    /// Where saved results go
    #[serde(default)]
    pub results: ResultsConfig,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,
}

/// Serial line settings
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    /// Baud rate used when opening a port
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// How long a status read waits for a line
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn default_baud_rate() -> u32 {
    115_200
}
fn default_read_timeout() -> u64 {
    1_000
}

/// Result storage settings
#[derive(Debug, Deserialize, Default)]
pub struct ResultsConfig {
    /// Override for the results directory
    pub dir: Option<PathBuf>,
}

/// Default settings
#[derive(Debug, Deserialize, Default)]
pub struct Defaults {
    /// Device used when `--port` is not given
    pub port: Option<String>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Directory results are written to
    pub fn results_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.results.dir {
            return Ok(dir.clone());
        }
        results_dir().ok_or_else(|| {
            super::Error::Config(
                "Could not determine a results directory. Set results.dir in the config file"
                    .to_string(),
            )
        })
    }

    /// Pick the device: explicit flag first, then the configured default
    pub fn resolve_port(&self, flag: Option<String>) -> Result<String> {
        flag.or_else(|| self.defaults.port.clone())
            .ok_or(super::Error::NoPort)
    }
}
