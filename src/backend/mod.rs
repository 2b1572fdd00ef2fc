//! Device backend
//!
//! The executor never touches a port itself. Everything that reaches the
//! outside world goes through [`Backend`]: writing a line to a device,
//! reading its status, and persisting a result set.

mod scripted;
mod serial;
mod store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::Result;

pub use scripted::{ScriptedBackend, WrittenLine};
pub use serial::{list_ports, PortSummary, SerialBackend};
pub use store::ResultStore;

/// Device status captured after a command that asked for a read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Command identifier that produced the status
    pub command: String,
    /// Status text returned by the device, verbatim
    pub result: String,
}

impl ResultRecord {
    pub fn new(command: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
        }
    }
}

/// Operations the executor needs from the outside world
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send a literal line to the named device
    async fn write_to_port(&self, port_name: &str, data: &str) -> Result<()>;

    /// Query the device's current status
    async fn read_device_status(&self, port_name: &str) -> Result<String>;

    /// Persist a result set, returning where it went
    async fn save_results(&self, results: &[ResultRecord]) -> Result<String>;
}
