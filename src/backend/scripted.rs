//! Scripted backend
//!
//! Stands in for a device: records every line written, answers status
//! reads from a script, and keeps saved result sets in memory. Used for
//! dry runs and tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};

use super::{Backend, ResultRecord};
use crate::common::{Error, Result};

/// One line written to a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenLine {
    pub port: String,
    pub data: String,
}

#[derive(Default)]
struct Script {
    statuses: VecDeque<std::result::Result<String, String>>,
    failing_prefixes: HashSet<String>,
    fail_saves: bool,
    writes: Vec<WrittenLine>,
    reads: usize,
    saved: Vec<Vec<ResultRecord>>,
}

/// In-memory device double
pub struct ScriptedBackend {
    default_status: String,
    gate: Option<Arc<Semaphore>>,
    script: Mutex<Script>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Every status read answers "OK" unless scripted otherwise
    pub fn new() -> Self {
        Self {
            default_status: "OK".to_string(),
            gate: None,
            script: Mutex::new(Script::default()),
        }
    }

    /// Reply used once the scripted statuses run out
    pub fn with_default_status(mut self, status: impl Into<String>) -> Self {
        self.default_status = status.into();
        self
    }

    /// Queue status replies, consumed in order
    pub fn with_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .get_mut()
            .statuses
            .extend(statuses.into_iter().map(|s| Ok(s.into())));
        self
    }

    /// Every write waits for a permit from `gate`
    ///
    /// Lets a caller hold a run in the middle of a command.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Queue a failing status read
    pub async fn push_read_failure(&self, reason: impl Into<String>) {
        self.script.lock().await.statuses.push_back(Err(reason.into()));
    }

    /// Fail every write whose line starts with `prefix`
    pub async fn fail_writes_starting_with(&self, prefix: impl Into<String>) {
        self.script.lock().await.failing_prefixes.insert(prefix.into());
    }

    /// Fail every save from now on
    pub async fn fail_saves(&self) {
        self.script.lock().await.fail_saves = true;
    }

    /// Lines written so far, in order
    pub async fn writes(&self) -> Vec<WrittenLine> {
        self.script.lock().await.writes.clone()
    }

    /// Number of status reads answered or failed
    pub async fn read_count(&self) -> usize {
        self.script.lock().await.reads
    }

    /// Result sets saved so far, in order
    pub async fn saved(&self) -> Vec<Vec<ResultRecord>> {
        self.script.lock().await.saved.clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn write_to_port(&self, port_name: &str, data: &str) -> Result<()> {
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| Error::Internal("write gate closed".to_string()))?
                .forget();
        }

        let mut script = self.script.lock().await;
        if script
            .failing_prefixes
            .iter()
            .any(|prefix| data.starts_with(prefix.as_str()))
        {
            return Err(Error::Scripted(format!(
                "write of '{}' rejected",
                data.escape_default()
            )));
        }

        script.writes.push(WrittenLine {
            port: port_name.to_string(),
            data: data.to_string(),
        });
        Ok(())
    }

    async fn read_device_status(&self, _port_name: &str) -> Result<String> {
        let mut script = self.script.lock().await;
        script.reads += 1;
        match script.statuses.pop_front() {
            Some(Ok(status)) => Ok(status),
            Some(Err(reason)) => Err(Error::Scripted(reason)),
            None => Ok(self.default_status.clone()),
        }
    }

    async fn save_results(&self, results: &[ResultRecord]) -> Result<String> {
        let mut script = self.script.lock().await;
        if script.fail_saves {
            return Err(Error::Scripted("save rejected".to_string()));
        }
        script.saved.push(results.to_vec());
        Ok(format!("memory:{}", script.saved.len()))
    }
}
