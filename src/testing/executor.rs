//! Test step executor
//!
//! Walks a [`TestPlan`] one command at a time against a single device.
//! A single `start()` drives the whole plan: each command is written,
//! optionally followed by a status read, and the cursor moves on whether
//! or not the command succeeded. Failures are logged and tagged in the
//! command outcomes; they never stop the run.
//!
//! Run state lives in a `watch` cell, so observers can read it at any time
//! or subscribe to changes while only the running chain mutates it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use super::plan::{Cursor, TestCommand, TestPlan};
use crate::backend::{Backend, ResultRecord};
use crate::common::Result;

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    InProgress,
    Finished,
}

/// How a single command went
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Outcome of one executed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    /// Where in the plan the command sits
    pub cursor: Cursor,
    /// Command identifier
    pub command: String,
    pub outcome: Outcome,
}

/// Everything observable about a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSnapshot {
    pub state: RunState,
    pub cursor: Cursor,
    /// Status reads, in execution order
    pub results: Vec<ResultRecord>,
    /// One entry per executed command, in execution order
    pub outcomes: Vec<CommandOutcome>,
}

/// Drives a test plan against one device
pub struct TestExecutor {
    device: String,
    plan: TestPlan,
    backend: Arc<dyn Backend>,
    run: watch::Sender<RunSnapshot>,
}

impl std::fmt::Debug for TestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestExecutor")
            .field("device", &self.device)
            .field("plan", &self.plan.name)
            .field("run", &*self.run.borrow())
            .finish()
    }
}

impl TestExecutor {
    /// Create an executor for `device`
    ///
    /// Fails if the plan has no steps, a step has no commands, or a
    /// command contains a line break.
    pub fn new(device: impl Into<String>, plan: TestPlan, backend: Arc<dyn Backend>) -> Result<Self> {
        plan.validate()?;
        let (run, _) = watch::channel(RunSnapshot::default());
        Ok(Self {
            device: device.into(),
            plan,
            backend,
            run,
        })
    }

    /// Run the plan from the current cursor to the end
    ///
    /// Ignored while a run is in progress or after the plan finished. If
    /// the returned future is dropped mid-run the state drops back to
    /// `Idle`, and a later `start()` resumes from the cursor.
    pub async fn start(&self) {
        let claimed = self.run.send_if_modified(|run| {
            if run.state != RunState::Idle {
                return false;
            }
            run.state = RunState::InProgress;
            true
        });
        if !claimed {
            tracing::debug!(device = %self.device, state = ?self.state(), "Start ignored");
            return;
        }

        let _guard = RunGuard { run: &self.run };
        tracing::info!(
            device = %self.device,
            plan = self.plan.name.as_deref().unwrap_or("unnamed"),
            commands = self.plan.command_count(),
            "Test run started"
        );

        while !self.advance().await {}

        let failed = self
            .run
            .borrow()
            .outcomes
            .iter()
            .filter(|o| !o.outcome.is_success())
            .count();
        tracing::info!(device = %self.device, failed, "Test run finished");
    }

    /// Execute the command under the cursor, then move the cursor
    ///
    /// Returns true once the plan is exhausted.
    async fn advance(&self) -> bool {
        let cursor = self.cursor();
        let Some(command) = self.plan.command_at(cursor) else {
            self.run.send_modify(|run| run.state = RunState::Finished);
            return true;
        };

        let (outcome, record) = match self.execute(command).await {
            Ok(record) => (Outcome::Success, record),
            Err(e) => {
                tracing::error!(
                    device = %self.device,
                    command = %command.command,
                    position = %cursor,
                    error = %e,
                    "Error during command execution"
                );
                (Outcome::Failed(e.to_string()), None)
            }
        };

        let next = self.plan.next_cursor(cursor);
        self.run.send_modify(|run| {
            run.results.extend(record);
            run.outcomes.push(CommandOutcome {
                cursor,
                command: command.command.clone(),
                outcome,
            });
            match next {
                Some(next) => run.cursor = next,
                None => run.state = RunState::Finished,
            }
        });

        next.is_none()
    }

    async fn execute(&self, command: &TestCommand) -> Result<Option<ResultRecord>> {
        let line = command.line();
        tracing::debug!(device = %self.device, line = %line.escape_default(), "Sending command");
        self.backend.write_to_port(&self.device, &line).await?;

        if !command.execute_read_after {
            return Ok(None);
        }

        let status = self.backend.read_device_status(&self.device).await?;
        tracing::debug!(device = %self.device, command = %command.command, status = %status, "Device status");
        Ok(Some(ResultRecord::new(command.command.clone(), status)))
    }

    /// Hand the results gathered so far to the backend
    ///
    /// Can be called at any point and any number of times. Returns the
    /// backend's location for the saved set, or `None` if saving failed
    /// (the error is logged).
    pub async fn save_results(&self) -> Option<String> {
        let results = self.results();
        match self.backend.save_results(&results).await {
            Ok(location) => {
                tracing::info!(count = results.len(), location = %location, "Results saved");
                Some(location)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error saving results");
                None
            }
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn plan(&self) -> &TestPlan {
        &self.plan
    }

    pub fn state(&self) -> RunState {
        self.run.borrow().state
    }

    pub fn cursor(&self) -> Cursor {
        self.run.borrow().cursor
    }

    pub fn is_in_progress(&self) -> bool {
        self.state() == RunState::InProgress
    }

    pub fn is_finished(&self) -> bool {
        self.state() == RunState::Finished
    }

    pub fn results(&self) -> Vec<ResultRecord> {
        self.run.borrow().results.clone()
    }

    pub fn outcomes(&self) -> Vec<CommandOutcome> {
        self.run.borrow().outcomes.clone()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.run.borrow().clone()
    }

    /// Receive a notification on every change to the run
    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.run.subscribe()
    }
}

/// Puts an interrupted run back to `Idle`
struct RunGuard<'a> {
    run: &'a watch::Sender<RunSnapshot>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.run.send_if_modified(|run| {
            if run.state != RunState::InProgress {
                return false;
            }
            run.state = RunState::Idle;
            true
        });
    }
}
