//! Flamegraph generation using the inferno library.
//!
//! This module converts collapsed stacks into interactive SVG flamegraphs
//! and plain-text hot path summaries.

pub mod generator;

// Re-export main types
pub use generator::{generate_flamegraph, generate_text_summary, to_self_weights, FlamegraphConfig};
