//! Collapsed-stack trace handler.
//!
//! Entries and exits are folded into an [`Aggregator`]; nothing is
//! written until `deinit`, when the whole tree is serialized through
//! the sink in one pass.

use super::{open_trace_sink, TraceHandler};
use crate::aggregator::Aggregator;
use crate::function::FunctionDescriptor;
use crate::output::sink::Sink;
use crate::utils::config::TraceConfig;
use crate::utils::error::TraceError;
use log::{debug, error, info};

/// Collapsed-stack tracer for one execution
#[derive(Debug)]
pub struct CollapsedTracer {
    aggregator: Aggregator,
    sink: Option<Sink>,
    filename: String,
}

impl CollapsedTracer {
    /// Start a collapsed trace
    ///
    /// The mode is validated before the destination is touched, so an
    /// invalid mode never creates a file.
    ///
    /// # Errors
    /// * `TraceError::Config` - Mode is neither `calls` nor `time`
    /// * `TraceError::Sink` - Destination could not be opened
    pub fn init(destination: &str, config: &TraceConfig) -> Result<Self, TraceError> {
        let mode = config.aggregation_mode().map_err(|e| {
            error!("{}", e);
            e
        })?;

        let sink = open_trace_sink(destination, config)?;
        let filename = sink.name().to_string();

        info!("Collapsed trace ({} mode) writing to: {}", mode, filename);

        Ok(Self {
            aggregator: Aggregator::new(mode),
            sink: Some(sink),
            filename,
        })
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Whether `deinit` has already run
    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    fn write_footer(&self, sink: &mut Sink) -> Result<(), TraceError> {
        let lines = self
            .aggregator
            .write_collapsed(sink)
            .map_err(|source| TraceError::Footer {
                name: self.filename.clone(),
                source,
            })?;

        debug!("Wrote {} call paths to {}", lines, self.filename);
        Ok(())
    }
}

impl TraceHandler for CollapsedTracer {
    fn function_entry(&mut self, function: &FunctionDescriptor, timestamp: u64) {
        self.aggregator.enter(function, timestamp);
    }

    fn function_exit(&mut self, _function: &FunctionDescriptor, timestamp: u64) {
        self.aggregator.exit(timestamp);
    }

    fn output_filename(&self) -> &str {
        &self.filename
    }

    fn deinit(&mut self) -> Result<(), TraceError> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(());
        };

        let footer = self.write_footer(&mut sink);
        let closed = sink.close();
        let released = self.aggregator.reset();

        info!("Collapsed trace closed: {} ({} call paths)", self.filename, released);

        footer?;
        closed?;
        Ok(())
    }
}

impl Drop for CollapsedTracer {
    fn drop(&mut self) {
        if let Err(e) = self.deinit() {
            error!("Failed to finish collapsed trace: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_mode_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("trace").to_string_lossy().into_owned();
        let config = TraceConfig::new().with_mode("memory");

        let result = CollapsedTracer::init(&destination, &config);

        assert!(matches!(result, Err(TraceError::Config(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_deinit_twice_is_safe() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("trace").to_string_lossy().into_owned();

        let mut tracer = CollapsedTracer::init(&destination, &TraceConfig::new()).unwrap();
        tracer.function_entry(&FunctionDescriptor::main(), 0);
        tracer.function_exit(&FunctionDescriptor::main(), 10);

        tracer.deinit().unwrap();
        tracer.deinit().unwrap();

        assert!(tracer.is_closed());
        assert_eq!(tracer.aggregator().frame_count(), 0);
        let content = std::fs::read_to_string(tracer.output_filename()).unwrap();
        assert_eq!(content, "{main} 1\n");
    }

    #[test]
    fn test_drop_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("trace").to_string_lossy().into_owned();

        let filename = {
            let mut tracer = CollapsedTracer::init(&destination, &TraceConfig::new()).unwrap();
            tracer.function_entry(&FunctionDescriptor::function("work"), 0);
            tracer.function_exit(&FunctionDescriptor::function("work"), 1);
            tracer.output_filename().to_string()
        };

        assert_eq!(std::fs::read_to_string(filename).unwrap(), "work 1\n");
    }
}
