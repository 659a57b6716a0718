//! Configuration and constants for the tracer and the CLI.

use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Buffered sinks flush once their buffer grows past this many bytes
pub const BUFFER_SOFT_CAP: usize = 4096;

// Destinations with this suffix are always Unix-domain socket targets
pub const SOCKET_SUFFIX: &str = ".sock";
pub const COMPRESSED_EXTENSION: &str = "gz";

/// Extension appended to collapsed trace destinations
pub const TRACE_EXTENSION: &str = "txt";

/// Which per-frame counter the collapsed output carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Number of completed calls of each call path
    Calls,
    /// Cumulative nanoseconds spent in each call path
    Time,
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMode::Calls => "calls",
            AggregationMode::Time => "time",
        }
    }
}

impl FromStr for AggregationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calls" => Ok(AggregationMode::Calls),
            "time" => Ok(AggregationMode::Time),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings handed to a trace handler at init
///
/// The mode stays textual so that a bad value surfaces as a
/// `ConfigError` at init, before any output is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// `"calls"` or `"time"`
    pub mode: String,

    /// Write a gzip stream instead of plain text
    pub compress: bool,

    /// Append to an existing trace instead of truncating it
    pub append: bool,

    /// Collect output in memory and flush in chunks
    pub buffer_output: bool,

    /// Soft capacity of the output buffer in bytes
    pub buffer_soft_capacity: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            mode: AggregationMode::Calls.as_str().to_string(),
            compress: false,
            append: false,
            buffer_output: true,
            buffer_soft_capacity: BUFFER_SOFT_CAP,
        }
    }
}

impl TraceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn with_buffer_output(mut self, buffer_output: bool) -> Self {
        self.buffer_output = buffer_output;
        self
    }

    /// Parse the configured aggregation mode
    pub fn aggregation_mode(&self) -> Result<AggregationMode, ConfigError> {
        self.mode.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("calls".parse::<AggregationMode>().unwrap(), AggregationMode::Calls);
        assert_eq!("time".parse::<AggregationMode>().unwrap(), AggregationMode::Time);
    }

    #[test]
    fn test_parse_mode_is_exact() {
        assert!("Calls".parse::<AggregationMode>().is_err());
        assert!("".parse::<AggregationMode>().is_err());

        let err = "memory".parse::<AggregationMode>().unwrap_err();
        assert!(err.to_string().contains("memory"));
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: TraceConfig = serde_json::from_str(r#"{"mode":"time","compress":true}"#).unwrap();

        assert_eq!(config.aggregation_mode().unwrap(), AggregationMode::Time);
        assert!(config.compress);
        assert!(config.buffer_output);
        assert_eq!(config.buffer_soft_capacity, BUFFER_SOFT_CAP);
    }
}
