//! Output Sink for the final report
//!
//! # Design
//!
//! The report is formatted into a reusable `Vec<u8>` by
//! [`emit_report`](crate::report::emit_report) and handed to the sink in
//! batches. The sink owns buffering; the pipeline only calls `write_all` and,
//! once at the end, `flush`.
//!
//! # Correctness Guarantees
//!
//! - **Single writer**: the report is emitted from one thread after merge, so
//!   batch order equals key order.
//! - **Errors propagate**: write and flush failures are returned, and the
//!   pipeline maps them to [`PipelineError::Output`](crate::PipelineError::Output).
//! - **No durability guarantee**: `flush()` pushes data to the OS, not to
//!   stable storage.
//!
//! # Implementations
//!
//! | Sink | Use |
//! |------|-----|
//! | [`StdoutSink`] | CLI output; `BrokenPipe` ignored (`brc \| head`) |
//! | [`FileSink`] | report written to a path |
//! | [`WriterSink`] | any `Write + Send` |
//! | [`VecSink`] | tests |
//! | [`NullSink`] | benchmarks |

use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;
use std::sync::Mutex;

/// Default buffer size for buffered sinks (64 KiB).
///
/// A full report for ~10k stations is well under 1 MiB, so a handful of
/// syscalls at most.
const DEFAULT_BUF_CAPACITY: usize = 64 * 1024;

// ============================================================================
// Trait
// ============================================================================

/// Sequential byte sink for the rendered report.
///
/// `Send + Sync` so a sink can be shared behind an `Arc` with whoever owns
/// the process output.
pub trait OutputSink: Send + Sync {
    /// Write a batch of bytes.
    fn write_all(&self, bytes: &[u8]) -> io::Result<()>;

    /// Flush buffered data to the OS.
    fn flush(&self) -> io::Result<()>;
}

fn lock_poisoned() -> io::Error {
    io::Error::other("output sink mutex poisoned")
}

// ============================================================================
// StdoutSink
// ============================================================================

/// Buffered stdout.
///
/// # BrokenPipe Handling
///
/// When stdout is piped to a process that exits early (`brc | head -n 5`),
/// writes return `BrokenPipe`. The sink treats that as success, which is
/// standard CLI behavior.
pub struct StdoutSink {
    out: Mutex<BufWriter<io::Stdout>>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUF_CAPACITY)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            out: Mutex::new(BufWriter::with_capacity(cap, io::stdout())),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

fn ignore_broken_pipe(res: io::Result<()>) -> io::Result<()> {
    match res {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

impl OutputSink for StdoutSink {
    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let mut out = self.out.lock().map_err(|_| lock_poisoned())?;
        ignore_broken_pipe(out.write_all(bytes))
    }

    fn flush(&self) -> io::Result<()> {
        let mut out = self.out.lock().map_err(|_| lock_poisoned())?;
        ignore_broken_pipe(out.flush())
    }
}

// ============================================================================
// WriterSink / FileSink
// ============================================================================

/// Buffered sink over any writer.
pub struct WriterSink<W: Write + Send> {
    out: Mutex<BufWriter<W>>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(DEFAULT_BUF_CAPACITY, inner)
    }

    pub fn with_capacity(cap: usize, inner: W) -> Self {
        Self {
            out: Mutex::new(BufWriter::with_capacity(cap, inner)),
        }
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> io::Result<W> {
        let out = self.out.into_inner().map_err(|_| lock_poisoned())?;
        out.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write + Send> OutputSink for WriterSink<W> {
    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        self.out.lock().map_err(|_| lock_poisoned())?.write_all(bytes)
    }

    fn flush(&self) -> io::Result<()> {
        self.out.lock().map_err(|_| lock_poisoned())?.flush()
    }
}

/// Report written to a file (created or truncated).
pub type FileSink = WriterSink<std::fs::File>;

impl WriterSink<std::fs::File> {
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(std::fs::File::create(path)?))
    }
}

// ============================================================================
// VecSink (for testing)
// ============================================================================

/// Captures all bytes in memory. Use `take()` after the run.
pub struct VecSink {
    buf: Mutex<Vec<u8>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            buf: Mutex::new(Vec::new()),
        }
    }

    /// Extract captured bytes, leaving the sink empty.
    pub fn take(&self) -> Vec<u8> {
        match self.buf.lock() {
            Ok(mut g) => std::mem::take(&mut *g),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Captured bytes as (lossy) UTF-8, leaving the sink empty.
    pub fn take_string(&self) -> String {
        String::from_utf8_lossy(&self.take()).into_owned()
    }
}

impl Default for VecSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for VecSink {
    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        self.buf
            .lock()
            .map_err(|_| lock_poisoned())?
            .extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// NullSink (for benchmarking)
// ============================================================================

/// Discards all output.
#[derive(Debug, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write_all(&self, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
