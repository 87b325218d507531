//! # Station Tables
//!
//! Key -> [`Aggregate`] mapping used both as a worker's private table and as
//! the global result after merge.
//!
//! ## Key Ownership
//!
//! ```text
//! record(&chunk[a..b], v)
//!   ├─ present: get_mut(&[u8])        borrow only, no allocation
//!   └─ absent:  insert(Box::from(key)) one owned copy, kept for the table's life
//! ```
//!
//! Chunk buffers are recycled as soon as a worker finishes them, so a table
//! never holds a borrowed key. [`StationTable::merge`] consumes the other
//! table and moves its boxed keys, so merge allocates nothing per key.

use std::collections::hash_map::Entry;

use ahash::AHashMap;

use super::station::Aggregate;

/// Default initial capacity for a table (distinct keys).
pub const DEFAULT_EXPECTED_KEYS: usize = 1024;

/// Owned key -> aggregate table.
#[derive(Clone, Debug, Default)]
pub struct StationTable {
    map: AHashMap<Box<[u8]>, Aggregate>,
}

impl StationTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EXPECTED_KEYS)
    }

    pub fn with_capacity(keys: usize) -> Self {
        Self {
            map: AHashMap::with_capacity(keys),
        }
    }

    /// Fold one reading into the table.
    ///
    /// Returns `true` if `key` was not present before (a key copy was made).
    #[inline]
    pub fn record(&mut self, key: &[u8], value: i16) -> bool {
        if let Some(agg) = self.map.get_mut(key) {
            agg.add(value);
            return false;
        }
        self.map.insert(Box::from(key), Aggregate::from_reading(value));
        true
    }

    /// Fold `other` into `self`, consuming it.
    ///
    /// Keys absent from `self` move over without copying; shared keys combine
    /// with [`Aggregate::merge`]. Commutative and associative up to map order.
    pub fn merge(&mut self, other: StationTable) {
        if self.map.is_empty() {
            self.map = other.map;
            return;
        }
        for (key, agg) in other.map {
            match self.map.entry(key) {
                Entry::Occupied(mut slot) => slot.get_mut().merge(&agg),
                Entry::Vacant(slot) => {
                    slot.insert(agg);
                }
            }
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Aggregate> {
        self.map.get(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total readings across all keys.
    pub fn rows(&self) -> u64 {
        self.map.values().map(|agg| agg.count).sum()
    }

    /// Consume the table into `(key, aggregate)` pairs sorted by key bytes.
    pub fn into_sorted(self) -> Vec<(Box<[u8]>, Aggregate)> {
        let mut entries: Vec<_> = self.map.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

/// Fold a sequence of tables into one.
pub fn merge_tables<I>(tables: I) -> StationTable
where
    I: IntoIterator<Item = StationTable>,
{
    let mut global = StationTable::with_capacity(0);
    for table in tables {
        global.merge(table);
    }
    global
}
