//! Error types for the Vindicator test runner
//!
//! Messages are meant to be read by an operator at the bench, so most of
//! them say what to check next.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the test runner
#[derive(Error, Debug)]
pub enum Error {
    // === Serial Errors ===
    #[error("Failed to open serial port '{port}': {reason}. Use 'vindicator ports' to list available ports")]
    SerialOpen { port: String, reason: String },

    #[error("Serial I/O error on '{port}': {reason}")]
    SerialIo { port: String, reason: String },

    #[error("No response from '{port}' within {timeout_ms} ms")]
    ReadTimeout { port: String, timeout_ms: u64 },

    #[error("Serial port '{0}' closed by the device")]
    PortClosed(String),

    #[error("Failed to enumerate serial ports: {0}")]
    PortEnumeration(String),

    #[error("No serial port given. Pass --port or set defaults.port in the config file")]
    NoPort,

    // === Plan Errors ===
    #[error("Test plan has no steps")]
    EmptyPlan,

    #[error("Step {index} ('{description}') has no commands")]
    EmptyStep { index: usize, description: String },

    #[error("Invalid test plan: {0}")]
    InvalidPlan(String),

    #[error("Failed to parse test plan: {0}")]
    PlanParse(String),

    // === Backend Errors ===
    #[error("Failed to save results: {0}")]
    ResultsSave(String),

    #[error("Scripted backend failure: {0}")]
    Scripted(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a serial open error
    pub fn serial_open(port: &str, reason: impl ToString) -> Self {
        Self::SerialOpen {
            port: port.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a serial I/O error
    pub fn serial_io(port: &str, reason: impl ToString) -> Self {
        Self::SerialIo {
            port: port.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an empty step error
    pub fn empty_step(index: usize, description: &str) -> Self {
        Self::EmptyStep {
            index,
            description: description.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_open_message_has_hint() {
        let err = Error::serial_open("/dev/ttyUSB0", "permission denied");
        let msg = err.to_string();
        assert!(msg.contains("/dev/ttyUSB0"));
        assert!(msg.contains("permission denied"));
        assert!(msg.contains("vindicator ports"));
    }

    #[test]
    fn test_empty_step_message() {
        let err = Error::empty_step(2, "Reset");
        assert_eq!(err.to_string(), "Step 2 ('Reset') has no commands");
    }
}
