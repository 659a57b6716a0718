//! Aggregation of entry/exit events into call paths, and their analysis.
//!
//! This module turns a stream of function entries and exits into:
//! - A tree of distinct call paths with call counts and elapsed time
//! - Collapsed stack output (for flamegraph tools)
//! - Hot path analysis and weight distribution statistics

pub mod collapsed;
pub mod frame_tree;
pub mod metrics;
pub mod serializer;
pub mod stack_builder;

// Re-export main types and functions
pub use collapsed::Aggregator;
pub use frame_tree::{Frame, FrameId, FrameTree};
pub use metrics::{calculate_hot_paths, calculate_weight_distribution, total_weight, WeightDistribution};
pub use serializer::{render_collapsed, write_collapsed};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
