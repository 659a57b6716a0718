use crate::utils::config::{BUFFER_SOFT_CAP, REPORT_SCHEMA_VERSION, TRACE_EXTENSION};

/// Display version information
pub fn display_version() {
    println!("Collapsed Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Call-path aggregation and collapsed-stack output for execution tracers.");
    println!(
        "Traces are written to <output>.{} (.gz when compressed), buffered in {} byte chunks.",
        TRACE_EXTENSION, BUFFER_SOFT_CAP
    );
}
