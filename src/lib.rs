//! Collapsed Trace
//!
//! Call-path aggregation and collapsed-stack output for
//! function-level execution tracers.
//!
//! An instrumentation layer reports every function entry and exit to a
//! [`tracer::TraceHandler`]. The collapsed handler folds those events
//! into a tree of distinct call paths and, when the trace ends, writes
//! one `a;b;c weight` line per path to a file, a gzip stream or a Unix
//! socket.
//!
//! ## Getting Started
//!
//! ```ignore
//! use collapsed_trace::function::FunctionDescriptor;
//! use collapsed_trace::tracer::{CollapsedTracer, TraceHandler};
//! use collapsed_trace::utils::TraceConfig;
//!
//! let mut tracer = CollapsedTracer::init("/tmp/trace", &TraceConfig::new().with_mode("time"))?;
//! tracer.function_entry(&FunctionDescriptor::main(), 0);
//! tracer.function_exit(&FunctionDescriptor::main(), 1_000);
//! tracer.deinit()?; // writes /tmp/trace.txt
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod function;
pub mod output;
pub mod parser;
pub mod tracer;
pub mod utils;
