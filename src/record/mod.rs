//! Record-level parsing: one `key;value` line at a time.
//!
//! Nothing here allocates. Keys and values are returned as sub-slices of the
//! caller's buffer.

pub mod fixed_point;
pub mod line;

pub use fixed_point::{decode_scaled, is_scaled_shape, round_mean_tenths, Tenths};
pub use line::{split_record, Records, SplitStrategy, DELIMITER};
