//! Report and flamegraph commands.
//!
//! Both read a collapsed trace back from disk: `report` ranks the
//! heaviest call paths into a JSON report, `flamegraph` renders an SVG.

use crate::aggregator::{calculate_hot_paths, calculate_weight_distribution, total_weight};
use crate::flamegraph::{generate_flamegraph, generate_text_summary, FlamegraphConfig};
use crate::output::json::create_parent_dirs;
use crate::output::{validate_path, write_report, Report};
use crate::parser::read_collapsed;
use crate::utils::config::AggregationMode;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

/// Arguments for the report command
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Collapsed trace (plain or `.gz`)
    pub input: PathBuf,

    /// JSON report path (optional)
    pub output: Option<PathBuf>,

    /// What the trace weights measure
    pub mode: AggregationMode,

    /// Number of top hot paths to include
    pub top_paths: usize,

    /// Print text summary to stdout
    pub print_summary: bool,
}

/// Execute the report command
///
/// **Public** - main entry point called from main.rs
pub fn execute_report(args: &ReportArgs) -> Result<Report> {
    if args.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    let stacks = read_collapsed(&args.input)
        .with_context(|| format!("Failed to read collapsed trace {}", args.input.display()))?;

    let distribution = calculate_weight_distribution(&stacks);
    info!("Weight distribution: {}", distribution.summary());

    let total = total_weight(&stacks);
    let hot_paths = calculate_hot_paths(&stacks, total, args.top_paths);

    for (i, path) in hot_paths.iter().take(3).enumerate() {
        debug!("  {}. {} ({:.1}%): {}", i + 1, path.weight, path.percentage, path.stack);
    }

    let report = Report::new(
        args.input.display().to_string(),
        args.mode,
        total,
        stacks.len(),
        hot_paths,
    );

    if let Some(output) = &args.output {
        write_report(&report, output).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", output.display());
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("PROFILE SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Trace:        {}", args.input.display());
        println!("Mode:         {}", args.mode);
        println!("Total Weight: {}", total);
        println!("Unique Paths: {}", stacks.len());
        println!("\n{}", generate_text_summary(&stacks, 10, total));
        println!("{}", "=".repeat(80));
    }

    Ok(report)
}

/// Arguments for the flamegraph command
#[derive(Debug, Clone)]
pub struct FlamegraphArgs {
    /// Collapsed trace (plain or `.gz`)
    pub input: PathBuf,

    /// SVG output path
    pub output: PathBuf,

    pub config: FlamegraphConfig,
}

/// Execute the flamegraph command
pub fn execute_flamegraph(args: &FlamegraphArgs) -> Result<()> {
    let stacks = read_collapsed(&args.input)
        .with_context(|| format!("Failed to read collapsed trace {}", args.input.display()))?;

    let svg = generate_flamegraph(&stacks, Some(&args.config)).context("Failed to generate flamegraph")?;

    validate_path(&args.output)?;
    create_parent_dirs(&args.output)?;
    std::fs::write(&args.output, svg)
        .with_context(|| format!("Failed to write flamegraph {}", args.output.display()))?;

    info!("✓ Flamegraph written to: {}", args.output.display());

    Ok(())
}
