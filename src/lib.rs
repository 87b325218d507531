//! Parallel min/mean/max aggregation over `station;temperature` files.
//!
//! ## Scope
//! The crate consumes a byte stream of `key;value\n` records (value shaped
//! `[-]D[D].D`) and produces, for every distinct key, the minimum, mean and
//! maximum reading, sorted by key bytes.
//!
//! ## Key invariants
//! - Readings are integers in tenths from parse to render; only the mean is
//!   rounded, once, at emission.
//! - Every chunk handed to a worker starts and ends on a line boundary.
//! - Each worker owns its table outright; the only cross-thread structure on
//!   the hot path is the bounded chunk queue.
//! - A run either emits the full report or returns an error and emits nothing.
//!
//! ## Pipeline flow
//! `Read -> ChunkReader -> queue -> WorkerPool (StationTable each) -> join -> merge -> sort -> OutputSink`
//!
//! ## Notable entry points
//! - [`run`] / [`aggregate`] with a [`PipelineConfig`].
//! - [`record`]: fixed-point decoding and line splitting, usable on their own.
//! - [`scheduler`]: chunk reader, worker pool, metrics, output sinks.
//!
//! ```
//! use brc_pipeline::{run, PipelineConfig, VecSink};
//!
//! let sink = VecSink::new();
//! let input = &b"Tokyo;14.3\nTokyo;-5.2\nTokyo;38.9\n"[..];
//! run(input, &PipelineConfig::with_workers(2), &sink).unwrap();
//! assert_eq!(sink.take_string(), "Tokyo: -5.2/16.0/38.9\n");
//! ```

pub mod aggregate;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod scheduler;
#[cfg(test)]
pub mod test_utils;

pub use aggregate::{Aggregate, StationTable};
pub use error::{ConfigError, MalformedReason, PipelineError};
pub use pipeline::{aggregate, run, Aggregation, PipelineConfig, PipelineStats};
pub use record::SplitStrategy;
pub use report::{emit_report, render_report};
pub use scheduler::{FileSink, NullSink, OutputSink, StdoutSink, VecSink, WriterSink};
