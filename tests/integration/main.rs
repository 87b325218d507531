//! Integration tests for the aggregation pipeline and the `brc` binary.
//!
//! Run with: `cargo test --test integration`

mod cli;
