//! Trace handler that records nothing.
//!
//! Useful to measure the overhead of opening and closing a destination
//! without any aggregation on the hot path.

use super::{open_trace_sink, TraceHandler};
use crate::function::FunctionDescriptor;
use crate::output::sink::Sink;
use crate::utils::config::TraceConfig;
use crate::utils::error::TraceError;
use log::error;

#[derive(Debug)]
pub struct NoopTracer {
    sink: Option<Sink>,
    filename: String,
}

impl NoopTracer {
    pub fn init(destination: &str, config: &TraceConfig) -> Result<Self, TraceError> {
        let sink = open_trace_sink(destination, config)?;

        Ok(Self {
            filename: sink.name().to_string(),
            sink: Some(sink),
        })
    }
}

impl TraceHandler for NoopTracer {
    fn function_entry(&mut self, _function: &FunctionDescriptor, _timestamp: u64) {}

    fn function_exit(&mut self, _function: &FunctionDescriptor, _timestamp: u64) {}

    fn output_filename(&self) -> &str {
        &self.filename
    }

    fn deinit(&mut self) -> Result<(), TraceError> {
        match self.sink.take() {
            Some(mut sink) => Ok(sink.close()?),
            None => Ok(()),
        }
    }
}

impl Drop for NoopTracer {
    fn drop(&mut self) {
        if let Err(e) = self.deinit() {
            error!("Failed to close trace: {}", e);
        }
    }
}
