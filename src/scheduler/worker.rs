//! # Worker Pool
//!
//! N threads that each own a private [`StationTable`] and pull line-aligned
//! chunks from one shared bounded queue.
//!
//! ## Architecture
//!
//! ```text
//!   producer (caller thread)
//!        │  ChunkReader::next_chunk()
//!        ▼
//!   ┌──────────────────────────────┐   bounded(queue_depth)
//!   │   crossbeam_channel<Chunk>   │   producer blocks when full
//!   └──────────────┬───────────────┘   workers block when empty
//!        ┌─────────┼─────────┐
//!        ▼         ▼         ▼
//!   ┌─────────┐┌─────────┐┌─────────┐
//!   │worker 0 ││worker 1 ││worker N │   private StationTable each
//!   └────┬────┘└────┬────┘└────┬────┘   no locks on the hot path
//!        │          │          │
//!        └──── JoinHandle::join (barrier) ────► merge
//! ```
//!
//! Any worker may take any chunk; the shared receiver is the work-stealing
//! point. Buffers go back to the reader through the [`BufferRecycler`].
//!
//! ## Correctness Invariants
//!
//! - **Exclusive tables**: a table is touched by exactly one thread until join
//! - **Exactly-once chunks**: the channel hands each chunk to one receiver
//! - **Barrier**: [`WorkerPool::join`] returns only after every thread has
//!   observed the closed, drained queue (or aborted)
//! - **Fail-fast**: the first malformed record raises the abort flag; the
//!   producer stops reading and the other workers stop at their next chunk
//!
//! ## Shutdown
//!
//! Dropping the sender (inside `join`) is the only end-of-input signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use super::chunking::{BufferRecycler, Chunk};
use super::metrics::{MetricsSnapshot, WorkerMetricsLocal};
use crate::aggregate::{StationTable, DEFAULT_EXPECTED_KEYS};
use crate::error::{MalformedReason, PipelineError};
use crate::record::{decode_scaled, is_scaled_shape, split_record, Records, SplitStrategy};

/// Per-worker parsing options, copied into each thread.
#[derive(Clone, Copy, Debug)]
pub struct WorkerParams {
    pub split: SplitStrategy,
    pub validate_values: bool,
    pub expected_keys: usize,
}

impl Default for WorkerParams {
    fn default() -> Self {
        Self {
            split: SplitStrategy::default(),
            validate_values: true,
            expected_keys: DEFAULT_EXPECTED_KEYS,
        }
    }
}

/// What a worker hands back at join.
#[derive(Debug)]
pub struct WorkerOutput {
    pub table: StationTable,
    pub metrics: WorkerMetricsLocal,
}

/// Result of [`WorkerPool::join`]: every worker's table plus merged metrics.
#[derive(Debug)]
pub struct PoolReport {
    pub tables: Vec<StationTable>,
    pub metrics: MetricsSnapshot,
}

/// Fixed-size pool of aggregating workers.
pub struct WorkerPool {
    tx: Sender<Chunk>,
    handles: Vec<thread::JoinHandle<Result<WorkerOutput, PipelineError>>>,
    abort: Arc<AtomicBool>,
    recycler: BufferRecycler,
}

impl WorkerPool {
    /// Spawn `workers` threads sharing a queue of `queue_depth` chunks.
    ///
    /// # Errors
    /// [`PipelineError::Spawn`] if a thread cannot be created. Threads that
    /// were already started are shut down before returning.
    pub fn spawn(
        workers: usize,
        queue_depth: usize,
        params: WorkerParams,
    ) -> Result<Self, PipelineError> {
        let (tx, rx) = crossbeam_channel::bounded::<Chunk>(queue_depth);
        let abort = Arc::new(AtomicBool::new(false));
        // Enough idle slots for every chunk that can be in flight at once.
        let recycler = BufferRecycler::new(queue_depth + workers);

        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let rx = rx.clone();
            let abort_flag = Arc::clone(&abort);
            let recycler_ref = recycler.clone();
            let spawned = thread::Builder::new()
                .name(format!("brc-worker-{worker}"))
                .spawn(move || worker_loop(worker, rx, abort_flag, recycler_ref, params));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    abort.store(true, Ordering::Relaxed);
                    drop(tx);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(PipelineError::Spawn { worker, source });
                }
            }
        }

        Ok(Self {
            tx,
            handles,
            abort,
            recycler,
        })
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Recycler the producer should draw chunk buffers from.
    pub fn recycler(&self) -> BufferRecycler {
        self.recycler.clone()
    }

    /// Queue a chunk, blocking while the queue is full.
    ///
    /// Returns `false` if the pool has aborted or every worker is gone; the
    /// producer should stop reading.
    pub fn submit(&self, chunk: Chunk) -> bool {
        if self.is_aborted() {
            return false;
        }
        self.tx.send(chunk).is_ok()
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    /// Ask workers to stop at their next chunk (producer-side failure).
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    /// Close the queue and wait for every worker.
    ///
    /// # Errors
    /// The first worker error in worker order, or
    /// [`PipelineError::WorkerPanicked`].
    pub fn join(self) -> Result<PoolReport, PipelineError> {
        let WorkerPool { tx, handles, .. } = self;
        drop(tx);

        let mut tables = Vec::with_capacity(handles.len());
        let mut metrics = MetricsSnapshot::new();
        let mut first_err = None;

        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(out)) => {
                    metrics.merge_worker(&out.metrics);
                    tables.push(out.table);
                }
                Ok(Err(e)) => {
                    first_err.get_or_insert(e);
                }
                Err(_) => {
                    first_err.get_or_insert(PipelineError::WorkerPanicked { worker });
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(PoolReport { tables, metrics }),
        }
    }
}

fn worker_loop(
    worker: usize,
    rx: Receiver<Chunk>,
    abort: Arc<AtomicBool>,
    recycler: BufferRecycler,
    params: WorkerParams,
) -> Result<WorkerOutput, PipelineError> {
    let mut table = StationTable::with_capacity(params.expected_keys);
    let mut metrics = WorkerMetricsLocal::new();

    for chunk in rx.iter() {
        if abort.load(Ordering::Relaxed) {
            break;
        }
        if let Err(e) = aggregate_chunk(&chunk, params, &mut table, &mut metrics) {
            warn!(worker, error = %e, "worker aborting run");
            abort.store(true, Ordering::Relaxed);
            return Err(e);
        }
        recycler.give_back(chunk.into_buffer());
    }

    debug!(
        worker,
        chunks = metrics.chunks,
        rows = metrics.rows,
        keys = table.len(),
        "worker finished"
    );
    Ok(WorkerOutput { table, metrics })
}

/// Parse every record of `chunk` into `table`.
///
/// Records are folded in line order. On the first bad line the error names
/// its absolute stream offset; rows before it stay in `table`, but the
/// pipeline discards the table on error.
pub fn aggregate_chunk(
    chunk: &Chunk,
    params: WorkerParams,
    table: &mut StationTable,
    metrics: &mut WorkerMetricsLocal,
) -> Result<(), PipelineError> {
    for (pos, line) in Records::new(chunk.data()) {
        let offset = chunk.base_offset() + pos as u64;
        let (key, value) = split_record(line, params.split).ok_or_else(|| {
            PipelineError::malformed(offset, MalformedReason::MissingDelimiter, line)
        })?;
        if params.validate_values && !is_scaled_shape(value) {
            return Err(PipelineError::malformed(
                offset,
                MalformedReason::InvalidValue,
                line,
            ));
        }
        if table.record(key, decode_scaled(value)) {
            metrics.keys_inserted += 1;
        }
        metrics.rows += 1;
    }
    metrics.chunks += 1;
    metrics.bytes += chunk.len() as u64;
    Ok(())
}
