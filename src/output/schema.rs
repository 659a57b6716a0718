//! JSON report schema definitions.
//!
//! This module defines the structure of report files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::utils::config::{AggregationMode, REPORT_SCHEMA_VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Collapsed trace the report was built from
    pub source: String,

    /// What the weights measure
    pub mode: AggregationMode,

    /// Weight of all top-level call paths
    pub total_weight: u64,

    /// Number of distinct call paths
    pub stack_count: usize,

    /// Top hot paths (ranked by weight)
    pub hot_paths: Vec<HotPath>,

    /// Timestamp when report was generated
    pub generated_at: String,
}

impl Report {
    /// Create a report stamped with the current time
    pub fn new(
        source: impl Into<String>,
        mode: AggregationMode,
        total_weight: u64,
        stack_count: usize,
        hot_paths: Vec<HotPath>,
    ) -> Self {
        Self {
            version: REPORT_SCHEMA_VERSION.to_string(),
            source: source.into(),
            mode,
            total_weight,
            stack_count,
            hot_paths,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// A hot path (call path with its weight)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotPath {
    /// Collapsed stack representation (e.g., "{main};render;load")
    pub stack: String,

    /// Calls or nanoseconds attributed to this path
    pub weight: u64,

    /// Percentage of total weight
    pub percentage: f64,
}
