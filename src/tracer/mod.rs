//! Trace handlers driven by the instrumentation layer.
//!
//! A handler is created once per traced execution with `init`, receives
//! every function entry and exit, and is torn down with `deinit`, which
//! writes any trailing output and closes the destination.

pub mod collapsed;
pub mod noop;

pub use collapsed::CollapsedTracer;
pub use noop::NoopTracer;

use crate::function::FunctionDescriptor;
use crate::output::sink::{is_socket_destination, OpenMode, Sink, SinkOptions};
use crate::utils::config::{TraceConfig, TRACE_EXTENSION};
use crate::utils::error::{SinkError, TraceError};
use clap::ValueEnum;

/// Callbacks a trace handler receives
pub trait TraceHandler {
    /// A function was entered; must not fail
    fn function_entry(&mut self, function: &FunctionDescriptor, timestamp: u64);

    /// The innermost active function returned; must not fail
    fn function_exit(&mut self, function: &FunctionDescriptor, timestamp: u64);

    /// Resolved name of the output destination
    fn output_filename(&self) -> &str;

    /// Write trailing output and close the destination
    ///
    /// Safe to call more than once; only the first call does any work.
    fn deinit(&mut self) -> Result<(), TraceError>;
}

/// Available trace output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceFormat {
    /// Collapsed stacks for flamegraph tools
    Collapsed,
    /// Open and close the output, record nothing
    Noop,
}

/// Create the handler for `format`
pub fn open_handler(
    format: TraceFormat,
    destination: &str,
    config: &TraceConfig,
) -> Result<Box<dyn TraceHandler>, TraceError> {
    Ok(match format {
        TraceFormat::Collapsed => Box::new(CollapsedTracer::init(destination, config)?),
        TraceFormat::Noop => Box::new(NoopTracer::init(destination, config)?),
    })
}

/// Open the sink a handler writes to
///
/// File destinations get the trace extension appended; socket
/// destinations are used as given.
pub(crate) fn open_trace_sink(destination: &str, config: &TraceConfig) -> Result<Sink, SinkError> {
    let options = SinkOptions {
        mode: if config.append {
            OpenMode::Append
        } else {
            OpenMode::Write
        },
        compress: config.compress,
        buffered: config.buffer_output,
        soft_capacity: config.buffer_soft_capacity,
    };

    let extension = if is_socket_destination(destination) {
        None
    } else {
        Some(TRACE_EXTENSION)
    };

    Sink::open(destination, extension, &options)
}
