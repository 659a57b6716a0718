//! Replay of recorded entry/exit event logs.
//!
//! The log is JSON Lines, one event per line:
//!
//! ```text
//! {"event":"enter","timestamp":100,"function":{"kind":"main"}}
//! {"event":"enter","timestamp":150,"function":{"kind":"function","function":"foo"}}
//! {"event":"exit","timestamp":400}
//! {"event":"exit","timestamp":600}
//! ```
//!
//! Replaying a log drives a [`TraceHandler`] exactly as a live
//! instrumentation layer would.

use crate::function::{FunctionDescriptor, FunctionKind};
use crate::tracer::TraceHandler;
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// A single recorded event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TraceEvent {
    Enter {
        timestamp: u64,
        function: FunctionDescriptor,
    },
    Exit {
        timestamp: u64,
    },
}

/// Counters collected while replaying a log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub entries: u64,
    pub exits: u64,

    /// Exits seen while no call was open
    pub unmatched_exits: u64,

    /// Deepest nesting reached
    pub max_depth: usize,

    /// Calls still open when the log ended
    pub open_at_end: usize,
}

/// Parse one event line
pub fn parse_event(line: &str) -> Result<TraceEvent, serde_json::Error> {
    serde_json::from_str(line)
}

/// Replay every event in `reader` into `handler`
///
/// **Public** - main entry point for offline tracing
///
/// Blank lines are skipped. Parsing stops at the first malformed line;
/// events before it have already been delivered.
///
/// # Errors
/// * `ParseError::Io` - Reading the log failed
/// * `ParseError::InvalidEvent` - A line is not a valid event
pub fn replay_events<R: BufRead>(
    reader: R,
    handler: &mut dyn TraceHandler,
) -> Result<ReplayStats, ParseError> {
    let mut stats = ReplayStats::default();
    let mut open: Vec<FunctionDescriptor> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = parse_event(line).map_err(|source| ParseError::InvalidEvent {
            line: index + 1,
            source,
        })?;

        match event {
            TraceEvent::Enter {
                timestamp,
                function,
            } => {
                handler.function_entry(&function, timestamp);
                open.push(function);
                stats.entries += 1;
                stats.max_depth = stats.max_depth.max(open.len());
            }
            TraceEvent::Exit { timestamp } => {
                let function = open.pop().unwrap_or_else(|| {
                    stats.unmatched_exits += 1;
                    FunctionDescriptor::new(FunctionKind::Unknown)
                });
                handler.function_exit(&function, timestamp);
                stats.exits += 1;
            }
        }
    }

    stats.open_at_end = open.len();
    if stats.open_at_end > 0 {
        warn!("Event log ended with {} calls still open", stats.open_at_end);
    }

    debug!(
        "Replayed {} entries and {} exits (max depth {})",
        stats.entries, stats.exits, stats.max_depth
    );

    Ok(stats)
}
