//! Property-based tests for chunking and aggregation.
//!
//! Run with: `cargo test --test property`

mod aggregation;
mod chunk_repair;
mod fixed_point;
