//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod replay;
pub mod report;
pub mod utils;

// Re-export main command functions
pub use replay::{execute_replay, validate_replay_args, ReplayArgs, ReplayOutcome};
pub use report::{execute_flamegraph, execute_report, FlamegraphArgs, ReportArgs};
pub use utils::display_version;
