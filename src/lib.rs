//! Vindicator Test System
//!
//! Runs test plans against a hardware device over a serial line. A plan
//! is a list of steps, each a list of commands; the executor sends them
//! one by one, reads the device status where asked, and collects the
//! results for saving.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod common;
pub mod metadata;
pub mod testing;

// Re-export commonly used types for tests
pub use backend::{Backend, ResultRecord};
pub use common::{Error, Result};
pub use testing::{Cursor, RunState, TestExecutor, TestPlan};
