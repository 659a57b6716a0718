//! Output writers for trace data and reports.
//!
//! This module handles writing data out:
//! - Collapsed traces through a buffered sink (file, gzip, socket)
//! - JSON reports of hot paths

pub mod json;
pub mod schema;
pub mod sink;

// Re-export main types and functions
pub use json::{read_report, validate_path, write_report};
pub use schema::{HotPath, Report};
pub use sink::{BackendKind, OpenMode, Sink, SinkOptions, SinkStats};
