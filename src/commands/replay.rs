//! Replay command implementation.
//!
//! The replay command:
//! 1. Opens a trace handler on the destination
//! 2. Feeds it every event from a JSON Lines log
//! 3. Tears the handler down, which writes the collapsed stacks

use crate::parser::{replay_events, ReplayStats};
use crate::tracer::{open_handler, TraceFormat};
use crate::utils::config::TraceConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the replay command
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// JSON Lines event log
    pub events: PathBuf,

    /// Trace destination (file prefix or `.sock` path)
    pub output: String,

    pub format: TraceFormat,

    pub config: TraceConfig,
}

/// What a replay produced
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Resolved output name
    pub output_filename: String,

    pub stats: ReplayStats,
}

/// Execute the replay command
///
/// **Public** - main entry point called from main.rs
pub fn execute_replay(args: &ReplayArgs) -> Result<ReplayOutcome> {
    let start_time = Instant::now();

    info!("Replaying events from: {}", args.events.display());

    let file = File::open(&args.events)
        .with_context(|| format!("Failed to open event log {}", args.events.display()))?;

    let mut handler = open_handler(args.format, &args.output, &args.config)
        .with_context(|| format!("Failed to start trace at {}", args.output))?;

    let output_filename = handler.output_filename().to_string();
    debug!("Trace output: {}", output_filename);

    let replayed = replay_events(BufReader::new(file), handler.as_mut());

    // Always finish the trace so partial output is flushed
    let finished = handler.deinit();

    let stats = replayed.context("Failed to replay event log")?;
    finished.context("Failed to finish trace")?;

    info!(
        "Replayed {} calls into {} in {:.2}s",
        stats.entries,
        output_filename,
        start_time.elapsed().as_secs_f64()
    );

    Ok(ReplayOutcome {
        output_filename,
        stats,
    })
}

/// Validate replay arguments
///
/// **Public** - can be called before execute_replay for early validation
pub fn validate_replay_args(args: &ReplayArgs) -> Result<()> {
    if args.output.is_empty() {
        anyhow::bail!("Output destination cannot be empty");
    }

    if !args.events.is_file() {
        anyhow::bail!("Event log not found: {}", args.events.display());
    }

    args.config.aggregation_mode()?;

    if args.config.buffer_soft_capacity == 0 {
        anyhow::bail!("Buffer capacity must be greater than 0");
    }

    Ok(())
}
