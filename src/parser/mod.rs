//! Input parsing.
//!
//! This module handles:
//! - Replaying JSON Lines event logs into trace handlers
//! - Reading collapsed-stack output (plain or gzip) back into stacks

pub mod collapsed;
pub mod events;

// Re-export main types
pub use collapsed::{parse_collapsed, parse_collapsed_line, read_collapsed};
pub use events::{parse_event, replay_events, ReplayStats, TraceEvent};
