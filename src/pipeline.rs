//! Configuration, statistics and entry points for an aggregation run.
//!
//! ```text
//! Read -> ChunkReader -> bounded queue -> WorkerPool -> join -> merge -> sort -> OutputSink
//! ```
//!
//! [`aggregate`] runs everything up to the sorted result; [`run`] also emits
//! the report. Either the whole run succeeds or nothing is written.

use std::io::Read;

use tracing::{debug, info};

use crate::aggregate::{merge_tables, Aggregate, DEFAULT_EXPECTED_KEYS};
use crate::error::{ConfigError, PipelineError};
use crate::record::SplitStrategy;
use crate::report::emit_report;
use crate::scheduler::chunking::{ChunkReader, DEFAULT_CHUNK_SIZE};
use crate::scheduler::output_sink::OutputSink;
use crate::scheduler::worker::{WorkerParams, WorkerPool};

/// Tunables for one run. Passed explicitly; nothing is process-global.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Parallel aggregators.
    pub workers: usize,
    /// Bytes requested per read call.
    ///
    /// Each in-flight chunk is roughly this size plus one partial line.
    pub chunk_size: usize,
    /// Chunks that may wait in the queue before the reader blocks.
    ///
    /// Peak chunk memory ≈ `(queue_depth + workers) × chunk_size`.
    pub queue_depth: usize,
    /// Delimiter search strategy.
    pub split: SplitStrategy,
    /// Reject values not shaped `[-]D[D].D` instead of decoding them blindly.
    pub validate_values: bool,
    /// Initial capacity of each worker's table.
    pub expected_keys: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let workers = num_cpus::get().max(1);
        Self {
            workers,
            chunk_size: DEFAULT_CHUNK_SIZE,
            queue_depth: workers,
            split: SplitStrategy::default(),
            validate_values: true,
            expected_keys: DEFAULT_EXPECTED_KEYS,
        }
    }
}

impl PipelineConfig {
    /// Default config with `workers` aggregators and a matching queue depth.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            queue_depth: workers,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }
        Ok(())
    }

    fn worker_params(&self) -> WorkerParams {
        WorkerParams {
            split: self.split,
            validate_values: self.validate_values,
            expected_keys: self.expected_keys,
        }
    }
}

/// Summary counters for a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub workers: usize,
    /// Line-aligned chunks handed to workers.
    pub chunks: u64,
    /// Bytes read from the input.
    pub bytes: u64,
    /// Records aggregated.
    pub rows: u64,
    /// Distinct keys in the report.
    pub stations: usize,
}

/// Sorted per-key result of a successful run.
#[derive(Debug)]
pub struct Aggregation {
    /// `(key, aggregate)` sorted by key bytes.
    pub stations: Vec<(Box<[u8]>, Aggregate)>,
    pub stats: PipelineStats,
}

impl Aggregation {
    /// Look up one key (binary search over the sorted result).
    pub fn get(&self, key: &[u8]) -> Option<&Aggregate> {
        self.stations
            .binary_search_by(|(k, _)| k.as_ref().cmp(key))
            .ok()
            .map(|i| &self.stations[i].1)
    }
}

/// Read `input` to the end and aggregate it.
///
/// # Errors
/// - [`PipelineError::Config`] before any thread starts
/// - [`PipelineError::Read`] on a stream failure
/// - [`PipelineError::MalformedRecord`] on the first bad line
/// - [`PipelineError::Spawn`] / [`PipelineError::WorkerPanicked`]
pub fn aggregate<R: Read>(input: R, cfg: &PipelineConfig) -> Result<Aggregation, PipelineError> {
    cfg.validate()?;
    debug!(
        workers = cfg.workers,
        chunk_size = cfg.chunk_size,
        queue_depth = cfg.queue_depth,
        split = cfg.split.name(),
        validate = cfg.validate_values,
        "starting aggregation"
    );

    let pool = WorkerPool::spawn(cfg.workers, cfg.queue_depth, cfg.worker_params())?;
    let mut reader = ChunkReader::new(input, cfg.chunk_size).with_recycler(pool.recycler());

    let produced = loop {
        match reader.next_chunk() {
            Ok(Some(chunk)) => {
                if !pool.submit(chunk) {
                    break Ok(());
                }
            }
            Ok(None) => break Ok(()),
            Err(e) => {
                pool.abort();
                break Err(e);
            }
        }
    };
    let bytes = reader.bytes_read();

    // Barrier: every worker has seen the closed queue before merge starts.
    let joined = pool.join();
    produced?;
    let report = joined?;

    let workers = report.metrics.workers;
    let chunks = report.metrics.chunks;
    let rows = report.metrics.rows;
    let stations = merge_tables(report.tables).into_sorted();

    let stats = PipelineStats {
        workers,
        chunks,
        bytes,
        rows,
        stations: stations.len(),
    };
    info!(
        chunks = stats.chunks,
        bytes = stats.bytes,
        rows = stats.rows,
        stations = stats.stations,
        "aggregation complete"
    );
    Ok(Aggregation { stations, stats })
}

/// Aggregate `input` and write the sorted report to `sink`.
///
/// Nothing is written unless aggregation succeeds.
pub fn run<R: Read>(
    input: R,
    cfg: &PipelineConfig,
    sink: &dyn OutputSink,
) -> Result<PipelineStats, PipelineError> {
    let result = aggregate(input, cfg)?;
    emit_report(&result.stations, sink).map_err(PipelineError::Output)?;
    Ok(result.stats)
}
