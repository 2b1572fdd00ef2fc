//! JSON result files
//!
//! Every save produces a new file; earlier saves of the same run are kept.

use std::path::{Path, PathBuf};

use chrono::Local;

use super::ResultRecord;
use crate::common::{Error, Result};

/// Writes result sets into a directory
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `results` as a pretty JSON array and return the file path
    pub fn save(&self, results: &[ResultRecord]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            Error::ResultsSave(format!(
                "cannot create results directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;

        let path = self.unique_path(&Local::now().format("%Y%m%d-%H%M%S").to_string());
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json).map_err(|e| {
            Error::ResultsSave(format!("cannot write '{}': {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), count = results.len(), "Saved results");
        Ok(path)
    }

    fn unique_path(&self, stamp: &str) -> PathBuf {
        let first = self.dir.join(format!("results-{}.json", stamp));
        if !first.exists() {
            return first;
        }
        (1..)
            .map(|n| self.dir.join(format!("results-{}-{}.json", stamp, n)))
            .find(|p| !p.exists())
            .unwrap_or(first)
    }
}
