//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised by an output sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to open '{name}': {source}")]
    OpenFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to connect to socket '{name}': {source}")]
    ConnectFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to flush '{name}': wrote {written} of {expected} bytes")]
    ShortWrite {
        name: String,
        written: usize,
        expected: usize,
    },

    #[error("Failed to write '{name}': {source}")]
    WriteFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown or closed backend used with '{name}'")]
    UnknownBackend { name: String },
}

/// Errors in tracer configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid collapsed mode '{0}' (expected 'calls' or 'time')")]
    InvalidMode(String),
}

/// Errors surfaced by trace handlers at init and deinit
#[derive(Error, Debug)]
pub enum TraceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Failed to write collapsed stacks to '{name}': {source}")]
    Footer {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while reading event logs or collapsed stacks
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event on line {line}: {source}")]
    InvalidEvent {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid collapsed stack line: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("Failed to render flamegraph: {0}")]
    RenderFailed(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
