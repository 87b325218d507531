//! Scheduler: producer, worker pool and output plumbing.
//!
//! # Architecture
//!
//! One producer, N consumers:
//! - **Producer**: [`ChunkReader`] on the calling thread, sequential reads,
//!   boundary repair
//! - **Consumers**: [`WorkerPool`] threads, each with a private table
//!
//! The bounded chunk queue is the only shared mutable structure during a run.

pub mod chunking;
pub mod metrics;
pub mod output_sink;
pub mod worker;

pub use chunking::{BufferRecycler, Chunk, ChunkReader, DEFAULT_CHUNK_SIZE};
pub use metrics::{MetricsSnapshot, WorkerMetricsLocal};
pub use output_sink::{FileSink, NullSink, OutputSink, StdoutSink, VecSink, WriterSink};
pub use worker::{aggregate_chunk, PoolReport, WorkerOutput, WorkerParams, WorkerPool};
