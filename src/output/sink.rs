//! Buffered output sink for trace data.
//!
//! A sink writes to exactly one backend:
//! - a plain file (truncated or appended)
//! - a gzip-compressed file
//! - a connected Unix-domain stream socket
//!
//! With buffering enabled every write lands in memory first and the
//! backend only sees data once the buffer grows past its soft capacity
//! or the sink is closed.

use crate::utils::config::{BUFFER_SOFT_CAP, COMPRESSED_EXTENSION, SOCKET_SUFFIX};
use crate::utils::error::SinkError;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, error, warn};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// How a file destination is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create or truncate
    Write,
    /// Create or append
    Append,
}

/// Options for [`Sink::open`]
#[derive(Debug, Clone)]
pub struct SinkOptions {
    pub mode: OpenMode,
    pub compress: bool,
    pub buffered: bool,
    pub soft_capacity: usize,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            mode: OpenMode::Write,
            compress: false,
            buffered: false,
            soft_capacity: BUFFER_SOFT_CAP,
        }
    }
}

impl SinkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_buffering(mut self, buffered: bool) -> Self {
        self.buffered = buffered;
        self
    }
}

/// Which backend a sink ended up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Plain,
    Compressed,
    Socket,
    Closed,
}

/// Counters for data that actually reached the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Number of times data was handed to the backend
    pub backend_writes: u64,

    /// Total bytes accepted by the backend
    pub bytes_written: u64,
}

enum Backend {
    Plain(File),
    Compressed(GzEncoder<File>),
    #[cfg(unix)]
    Socket(UnixStream),
    Closed,
}

impl Backend {
    fn kind(&self) -> BackendKind {
        match self {
            Backend::Plain(_) => BackendKind::Plain,
            Backend::Compressed(_) => BackendKind::Compressed,
            #[cfg(unix)]
            Backend::Socket(_) => BackendKind::Socket,
            Backend::Closed => BackendKind::Closed,
        }
    }

    fn writer(&mut self) -> Option<&mut dyn Write> {
        match self {
            Backend::Plain(file) => Some(file),
            Backend::Compressed(encoder) => Some(encoder),
            #[cfg(unix)]
            Backend::Socket(stream) => Some(stream),
            Backend::Closed => None,
        }
    }
}

/// Output sink over a named destination
pub struct Sink {
    backend: Backend,
    name: String,
    buffer: Option<Vec<u8>>,
    soft_capacity: usize,
    stats: SinkStats,

    /// First flush failure hit while writing, reported again on close
    deferred: Option<SinkError>,
}

impl Sink {
    /// Open a sink
    ///
    /// **Public** - main entry point for trace output
    ///
    /// # Arguments
    /// * `destination` - File path or socket path (ending in `.sock`)
    /// * `extension` - Appended to file destinations as `.ext`
    /// * `options` - Open mode, compression and buffering
    ///
    /// # Errors
    /// * `SinkError::ConnectFailed` - Socket destination refused the connection
    /// * `SinkError::OpenFailed` - File could not be created or opened
    pub fn open(
        destination: &str,
        extension: Option<&str>,
        options: &SinkOptions,
    ) -> Result<Sink, SinkError> {
        let (backend, name) = open_backend(destination, extension, options)?;

        debug!("Opened {:?} sink '{}' (buffered: {})", backend.kind(), name, options.buffered);

        Ok(Sink {
            backend,
            name,
            buffer: options
                .buffered
                .then(|| Vec::with_capacity(options.soft_capacity + 1)),
            soft_capacity: options.soft_capacity,
            stats: SinkStats::default(),
            deferred: None,
        })
    }

    /// Resolved destination name (with extensions applied)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn is_buffered(&self) -> bool {
        self.buffer.is_some()
    }

    /// Bytes waiting in the buffer
    pub fn buffered_len(&self) -> usize {
        self.buffer.as_ref().map_or(0, Vec::len)
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// Write formatted text
    ///
    /// Buffered sinks flush once the buffer exceeds the soft capacity.
    /// A failed flush there does not fail the write: the text is already
    /// buffered, and the error is reported by [`Sink::close`].
    pub fn write_formatted(&mut self, args: fmt::Arguments<'_>) -> Result<(), SinkError> {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer
                .write_fmt(args)
                .map_err(|source| write_failed(&self.name, source))?;
            self.flush_if_over_capacity();
            return Ok(());
        }

        self.write_direct(args.to_string().as_bytes())
    }

    /// Write raw bytes, returning how many were accepted
    ///
    /// Buffered bytes always count as accepted, even when the flush they
    /// trigger fails.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, SinkError> {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.extend_from_slice(bytes);
            self.flush_if_over_capacity();
            return Ok(bytes.len());
        }

        self.write_direct(bytes)?;
        Ok(bytes.len())
    }

    /// Hand the whole buffer to the backend
    ///
    /// Partial writes are continued until the buffer is empty. If the
    /// backend stops accepting bytes or fails, only the accepted prefix
    /// leaves the buffer and the rest stays queued for the next flush.
    ///
    /// # Errors
    /// * `SinkError::ShortWrite` - Backend accepted no more bytes
    /// * `SinkError::WriteFailed` - Backend returned an I/O error
    pub fn flush_buffer(&mut self) -> Result<usize, SinkError> {
        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(0);
        };

        if buffer.is_empty() {
            return Ok(0);
        }

        let Some(writer) = self.backend.writer() else {
            return Err(unknown_backend(&self.name));
        };

        let expected = buffer.len();
        let (written, result) = drain_buffer(writer, buffer);

        self.stats.backend_writes += 1;
        self.stats.bytes_written += written as u64;

        match result {
            Ok(()) => Ok(written),
            Err(e) if e.kind() == io::ErrorKind::WriteZero => {
                error!("Failed to flush file '{}': wrote {} of {} bytes", self.name, written, expected);
                Err(SinkError::ShortWrite {
                    name: self.name.clone(),
                    written,
                    expected,
                })
            }
            Err(source) => Err(write_failed(&self.name, source)),
        }
    }

    /// Flush the backend
    ///
    /// A no-op for buffered sinks: their buffer only drains when it is
    /// over capacity or on close.
    pub fn flush(&mut self) -> Result<(), SinkError> {
        if self.buffer.is_some() {
            return Ok(());
        }

        let result = match &mut self.backend {
            Backend::Plain(file) => file.flush(),
            Backend::Compressed(encoder) => encoder.flush(),
            #[cfg(unix)]
            Backend::Socket(_) => Ok(()),
            Backend::Closed => return Err(unknown_backend(&self.name)),
        };

        result.map_err(|source| write_failed(&self.name, source))
    }

    /// Flush pending data and close the backend
    ///
    /// Closing twice is a no-op. For gzip output the returned status is
    /// the one from finishing the compressed stream.
    pub fn close(&mut self) -> Result<(), SinkError> {
        if matches!(self.backend, Backend::Closed) {
            return Ok(());
        }

        let flushed = self.flush_buffer();
        let deferred = self.deferred.take();

        let closed = match std::mem::replace(&mut self.backend, Backend::Closed) {
            Backend::Plain(mut file) => file.flush(),
            Backend::Compressed(encoder) => encoder.finish().map(drop),
            #[cfg(unix)]
            Backend::Socket(_) => Ok(()),
            Backend::Closed => Ok(()),
        };

        debug!(
            "Closed '{}' after {} backend writes ({} bytes)",
            self.name, self.stats.backend_writes, self.stats.bytes_written
        );

        if let Some(e) = deferred {
            return Err(e);
        }
        flushed?;
        closed.map_err(|source| write_failed(&self.name, source))
    }

    /// Flush once over capacity, keeping the first failure for `close`
    fn flush_if_over_capacity(&mut self) {
        if self.buffered_len() <= self.soft_capacity {
            return;
        }

        if let Err(e) = self.flush_buffer() {
            self.deferred.get_or_insert(e);
        }
    }

    fn write_direct(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        let Some(writer) = self.backend.writer() else {
            return Err(unknown_backend(&self.name));
        };

        writer
            .write_all(bytes)
            .map_err(|source| write_failed(&self.name, source))?;

        self.stats.backend_writes += 1;
        self.stats.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        Sink::flush(self).map_err(io::Error::other)
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("{}", e);
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("buffered_len", &self.buffered_len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Write `buffer` to `writer` until it is empty or the writer gives up
///
/// The accepted prefix is drained from `buffer` in every case. A writer
/// that accepts zero bytes ends the loop with `WriteZero`.
fn drain_buffer(writer: &mut dyn Write, buffer: &mut Vec<u8>) -> (usize, io::Result<()>) {
    let mut written = 0;

    let result = loop {
        if written == buffer.len() {
            break Ok(());
        }

        match writer.write(&buffer[written..]) {
            Ok(0) => break Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        }
    };

    buffer.drain(..written);
    (written, result)
}

/// Whether a destination names a Unix-domain socket
pub fn is_socket_destination(destination: &str) -> bool {
    destination.len() > SOCKET_SUFFIX.len() && destination.ends_with(SOCKET_SUFFIX)
}

fn open_backend(
    destination: &str,
    extension: Option<&str>,
    options: &SinkOptions,
) -> Result<(Backend, String), SinkError> {
    if is_socket_destination(destination) {
        let stream = connect_socket(destination)?;
        return Ok((stream, destination.to_string()));
    }

    if options.compress {
        if options.mode == OpenMode::Append {
            warn!(
                "Cannot append to '{}' while compression is turned on. Falling back to creating an uncompressed file",
                destination
            );
        } else {
            let extension = match extension {
                Some(ext) if !ext.is_empty() => format!("{}.{}", ext, COMPRESSED_EXTENSION),
                _ => COMPRESSED_EXTENSION.to_string(),
            };
            let name = file_name(destination, Some(&extension));
            let file = open_file(&name, options.mode)?;
            let encoder = GzEncoder::new(file, Compression::default());

            return Ok((Backend::Compressed(encoder), name));
        }
    }

    let name = file_name(destination, extension);
    let file = open_file(&name, options.mode)?;

    Ok((Backend::Plain(file), name))
}

#[cfg(unix)]
fn connect_socket(path: &str) -> Result<Backend, SinkError> {
    UnixStream::connect(path)
        .map(Backend::Socket)
        .map_err(|source| {
            error!("Failed to connect to socket '{}': {}", path, source);
            SinkError::ConnectFailed {
                name: path.to_string(),
                source,
            }
        })
}

#[cfg(not(unix))]
fn connect_socket(path: &str) -> Result<Backend, SinkError> {
    error!("Unix-domain sockets are not supported here, cannot connect to '{}'", path);
    Err(SinkError::ConnectFailed {
        name: path.to_string(),
        source: io::Error::new(io::ErrorKind::Unsupported, "Unix-domain sockets are not supported"),
    })
}

fn file_name(destination: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) if !ext.is_empty() => format!("{}.{}", destination, ext),
        _ => destination.to_string(),
    }
}

fn open_file(name: &str, mode: OpenMode) -> Result<File, SinkError> {
    let mut options = OpenOptions::new();
    match mode {
        OpenMode::Write => options.write(true).create(true).truncate(true),
        OpenMode::Append => options.append(true).create(true),
    };

    options.open(name).map_err(|source| {
        error!("Failed to open '{}': {}", name, source);
        SinkError::OpenFailed {
            name: name.to_string(),
            source,
        }
    })
}

fn write_failed(name: &str, source: io::Error) -> SinkError {
    error!("Failed to write '{}': {}", name, source);
    SinkError::WriteFailed {
        name: name.to_string(),
        source,
    }
}

fn unknown_backend(name: &str) -> SinkError {
    error!("Unknown file type used with '{}'", name);
    SinkError::UnknownBackend {
        name: name.to_string(),
    }
}
