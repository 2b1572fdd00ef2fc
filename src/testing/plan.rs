//! Test plan types
//!
//! Defines the data structures for deserializing test plans from YAML or
//! JSON files, plus the checks a plan must pass before it can run.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::common::{Error, Result};

/// A complete test plan: the ordered steps of one run
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    /// Optional name shown in run reports
    #[serde(default)]
    pub name: Option<String>,
    /// The sequence of steps to execute
    pub steps: Vec<TestStep>,
}

/// A named group of device commands executed in order
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TestStep {
    /// Human-readable description of the step
    pub description: String,
    /// Commands sent to the device, in order
    pub commands: Vec<TestCommand>,
}

/// One device instruction
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestCommand {
    /// Command identifier (e.g., "INIT")
    pub command: String,
    /// Parameter text appended verbatim to the command
    #[serde(default)]
    pub parameters: String,
    /// Read device status after sending and record it
    #[serde(default)]
    pub execute_read_after: bool,
}

impl TestCommand {
    pub fn new(command: impl Into<String>, parameters: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            parameters: parameters.into(),
            execute_read_after: false,
        }
    }

    /// Request a status read after this command
    pub fn read_after(mut self) -> Self {
        self.execute_read_after = true;
        self
    }

    /// The line sent to the device: command, parameters, CR LF
    pub fn line(&self) -> String {
        format!("{}{}\r\n", self.command, self.parameters)
    }
}

impl TestStep {
    pub fn new(description: impl Into<String>, commands: Vec<TestCommand>) -> Self {
        Self {
            description: description.into(),
            commands,
        }
    }
}

/// Position of the next command to execute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub step_index: usize,
    pub command_index: usize,
}

impl Cursor {
    pub fn new(step_index: usize, command_index: usize) -> Self {
        Self {
            step_index,
            command_index,
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.step_index + 1, self.command_index + 1)
    }
}

impl TestPlan {
    pub fn new(steps: Vec<TestStep>) -> Self {
        Self { name: None, steps }
    }

    /// Load a plan from a file
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&content).map_err(|e| Error::PlanParse(e.to_string()))
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse a plan from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::PlanParse(e.to_string()))
    }

    /// Check that every cursor position the run can reach is valid
    ///
    /// Empty plans and empty steps are rejected rather than skipped, and
    /// so is any CR or LF inside a command or its parameters since that
    /// would split the line the device sees.
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::EmptyPlan);
        }

        for (i, step) in self.steps.iter().enumerate() {
            if step.commands.is_empty() {
                return Err(Error::empty_step(i, &step.description));
            }
            for command in &step.commands {
                if contains_line_break(&command.command) || contains_line_break(&command.parameters)
                {
                    return Err(Error::InvalidPlan(format!(
                        "command '{}' in step {} ('{}') contains a line break",
                        command.command.escape_default(),
                        i,
                        step.description
                    )));
                }
            }
        }

        Ok(())
    }

    /// Command at a cursor position, if in bounds
    pub fn command_at(&self, cursor: Cursor) -> Option<&TestCommand> {
        self.steps
            .get(cursor.step_index)
            .and_then(|step| step.commands.get(cursor.command_index))
    }

    /// Where the cursor goes after `cursor`, or `None` at the end of the plan
    pub fn next_cursor(&self, cursor: Cursor) -> Option<Cursor> {
        let step = self.steps.get(cursor.step_index)?;
        if cursor.command_index + 1 < step.commands.len() {
            Some(Cursor::new(cursor.step_index, cursor.command_index + 1))
        } else if cursor.step_index + 1 < self.steps.len() {
            Some(Cursor::new(cursor.step_index + 1, 0))
        } else {
            None
        }
    }

    /// Total number of commands across all steps
    pub fn command_count(&self) -> usize {
        self.steps.iter().map(|s| s.commands.len()).sum()
    }

    /// Number of commands that request a status read
    pub fn read_count(&self) -> usize {
        self.steps
            .iter()
            .flat_map(|s| s.commands.iter())
            .filter(|c| c.execute_read_after)
            .count()
    }
}

fn contains_line_break(s: &str) -> bool {
    s.contains('\r') || s.contains('\n')
}
