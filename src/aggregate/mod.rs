//! Aggregation state: per-key statistics and the tables that hold them.

pub mod station;
pub mod table;

pub use station::Aggregate;
pub use table::{merge_tables, StationTable, DEFAULT_EXPECTED_KEYS};
