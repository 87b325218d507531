//! Error types for the aggregation pipeline.
//!
//! Every failure is terminal for the run: the pipeline never retries a read
//! and never emits a partial report. Callers get exactly one of "full sorted
//! report" or a [`PipelineError`].

use std::fmt;
use std::io;

use thiserror::Error;

/// Rejected [`PipelineConfig`](crate::PipelineConfig) values.
///
/// Checked before any worker thread is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("workers must be >= 1")]
    ZeroWorkers,
    #[error("chunk_size must be >= 1 byte")]
    ZeroChunkSize,
    #[error("queue_depth must be >= 1")]
    ZeroQueueDepth,
}

/// Why a line was rejected by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// No `;` where the active split strategy looks for it.
    MissingDelimiter,
    /// Value text is not of the `[-]D[D].D` shape.
    InvalidValue,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::MissingDelimiter => f.write_str("missing ';' delimiter"),
            MalformedReason::InvalidValue => f.write_str("value is not of the form [-]D[D].D"),
        }
    }
}

/// Fatal pipeline failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline configuration: {0}")]
    Config(#[from] ConfigError),

    /// Any read error other than end-of-stream. `offset` is the number of
    /// bytes successfully consumed before the failing call.
    #[error("read failed after {offset} bytes: {source}")]
    Read {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// `offset` is the absolute byte offset of the start of the line.
    #[error("malformed record at byte {offset}: {reason}: {line:?}")]
    MalformedRecord {
        offset: u64,
        reason: MalformedReason,
        line: String,
    },

    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

impl PipelineError {
    /// Build a [`PipelineError::MalformedRecord`], keeping at most
    /// [`MAX_REPORTED_LINE`] bytes of the offending line.
    pub(crate) fn malformed(offset: u64, reason: MalformedReason, line: &[u8]) -> Self {
        let shown = &line[..line.len().min(MAX_REPORTED_LINE)];
        PipelineError::MalformedRecord {
            offset,
            reason,
            line: String::from_utf8_lossy(shown).into_owned(),
        }
    }
}

/// Upper bound on line bytes copied into a [`PipelineError::MalformedRecord`].
pub const MAX_REPORTED_LINE: usize = 128;
