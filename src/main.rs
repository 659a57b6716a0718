//! Collapsed Trace CLI
//!
//! Replays recorded function entry/exit events into collapsed-stack
//! traces, and turns those traces into reports and flamegraphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use collapsed_trace::commands::{
    display_version, execute_flamegraph, execute_replay, execute_report, validate_replay_args,
    FlamegraphArgs, ReplayArgs, ReportArgs,
};
use collapsed_trace::flamegraph::FlamegraphConfig;
use collapsed_trace::tracer::TraceFormat;
use collapsed_trace::utils::config::{AggregationMode, TraceConfig, BUFFER_SOFT_CAP};

/// Collapsed Trace - call-path profiles for execution tracers
#[derive(Parser, Debug)]
#[command(name = "collapsed-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON Lines event log into a trace
    Replay {
        /// Event log to replay
        #[arg(short, long)]
        events: PathBuf,

        /// Trace destination; `.txt` is appended unless it ends in `.sock`
        #[arg(short, long)]
        output: String,

        /// Aggregation mode: calls or time
        #[arg(short, long, default_value = "calls", env = "COLLAPSED_TRACE_MODE")]
        mode: String,

        /// Output format
        #[arg(long, value_enum, default_value = "collapsed")]
        format: TraceFormat,

        /// Write a gzip-compressed trace
        #[arg(long)]
        compress: bool,

        /// Append to an existing trace (disables compression)
        #[arg(long)]
        append: bool,

        /// Write every line straight to the destination
        #[arg(long)]
        no_buffer: bool,

        /// Buffer flush threshold in bytes
        #[arg(long, default_value_t = BUFFER_SOFT_CAP)]
        buffer_size: usize,
    },

    /// Summarize a collapsed trace
    Report {
        /// Collapsed trace (plain or .gz)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON report (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What the trace weights measure: calls or time
        #[arg(short, long, default_value = "calls")]
        mode: String,

        /// Number of top hot paths to include
        #[arg(long, default_value = "20")]
        top_paths: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Render a collapsed trace as an SVG flamegraph
    Flamegraph {
        /// Collapsed trace (plain or .gz)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for SVG flamegraph
        #[arg(short, long, default_value = "flamegraph.svg")]
        output: PathBuf,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// What the trace weights measure: calls or time
        #[arg(short, long, default_value = "calls")]
        mode: String,

        /// Render time traces with their inclusive weights as recorded
        #[arg(long)]
        inclusive: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Replay {
            events,
            output,
            mode,
            format,
            compress,
            append,
            no_buffer,
            buffer_size,
        } => {
            let mut config = TraceConfig::new()
                .with_mode(mode)
                .with_compression(compress)
                .with_append(append)
                .with_buffer_output(!no_buffer);
            config.buffer_soft_capacity = buffer_size;

            let args = ReplayArgs {
                events,
                output,
                format,
                config,
            };

            // Validate args first
            validate_replay_args(&args)?;

            let outcome = execute_replay(&args)?;
            println!("{}", outcome.output_filename);
        }

        Commands::Report {
            input,
            output,
            mode,
            top_paths,
            summary,
        } => {
            let args = ReportArgs {
                input,
                output,
                mode: mode.parse::<AggregationMode>()?,
                top_paths,
                print_summary: summary,
            };

            execute_report(&args)?;
        }

        Commands::Flamegraph {
            input,
            output,
            title,
            width,
            mode,
            inclusive,
        } => {
            let mut config = FlamegraphConfig::for_mode(mode.parse::<AggregationMode>()?);

            if inclusive {
                config = config.with_self_weights(false);
            }

            if let Some(title_str) = title {
                config = config.with_title(title_str);
            }

            config.width = width;

            execute_flamegraph(&FlamegraphArgs {
                input,
                output,
                config,
            })?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
