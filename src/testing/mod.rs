//! Test plans and the step executor
//!
//! A plan is an ordered list of steps, each a list of device commands.
//! The executor walks it against one device through a backend and keeps
//! whatever status the device reports along the way.

mod executor;
mod plan;

pub use executor::{CommandOutcome, Outcome, RunSnapshot, RunState, TestExecutor};
pub use plan::{Cursor, TestCommand, TestPlan, TestStep};
