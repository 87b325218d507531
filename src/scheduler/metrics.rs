//! # Metrics Module
//!
//! Per-worker counters for the aggregation hot loop.
//!
//! ## Design
//!
//! - **Per-worker local metrics**: plain integer adds, no atomics
//! - **Cache-line aligned**: workers' counters never share a line
//! - **Post-run aggregation**: [`MetricsSnapshot::merge_worker`] after join

/// Counters owned by one worker for its whole lifetime.
///
/// NOT thread-safe. Merge into a [`MetricsSnapshot`] once the worker has
/// been joined.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[repr(align(64))]
pub struct WorkerMetricsLocal {
    /// Chunks fully parsed.
    pub chunks: u64,
    /// Chunk bytes parsed (including newlines).
    pub bytes: u64,
    /// Records folded into the local table.
    pub rows: u64,
    /// First-time keys (owned key copies made).
    pub keys_inserted: u64,
}

const _: () = {
    assert!(std::mem::align_of::<WorkerMetricsLocal>() >= 64);
};

impl WorkerMetricsLocal {
    pub const fn new() -> Self {
        Self {
            chunks: 0,
            bytes: 0,
            rows: 0,
            keys_inserted: 0,
        }
    }
}

/// Run-wide totals, built after every worker has finished.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub workers: usize,
    pub chunks: u64,
    pub bytes: u64,
    pub rows: u64,
    /// Sum of per-worker first-time keys. A key seen by k workers counts k
    /// times; the merged table size is the distinct count.
    pub keys_inserted: u64,
    /// Most chunks handled by any single worker.
    pub max_worker_chunks: u64,
}

impl MetricsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_worker(&mut self, w: &WorkerMetricsLocal) {
        self.workers += 1;
        self.chunks = self.chunks.saturating_add(w.chunks);
        self.bytes = self.bytes.saturating_add(w.bytes);
        self.rows = self.rows.saturating_add(w.rows);
        self.keys_inserted = self.keys_inserted.saturating_add(w.keys_inserted);
        self.max_worker_chunks = self.max_worker_chunks.max(w.chunks);
    }
}
