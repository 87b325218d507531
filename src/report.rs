//! # Report Rendering
//!
//! Turns the merged, key-sorted aggregates into the output format:
//!
//! ```text
//! <key>: <min>/<mean>/<max>\n        e.g.  Tokyo: -5.2/16.0/38.9
//! ```
//!
//! Every number has exactly one decimal digit. `min` and `max` are exact;
//! `mean` is `sum / count` in tenths rounded half-up
//! ([`round_mean_tenths`](crate::record::round_mean_tenths)). Keys are
//! written as raw bytes, so non-UTF-8 keys pass through untouched.
//!
//! Lines are formatted into one reusable buffer and handed to the sink in
//! batches of roughly [`EMIT_BATCH_BYTES`].

use std::io::{self, Write};

use crate::aggregate::Aggregate;
use crate::record::Tenths;
use crate::scheduler::output_sink::OutputSink;

/// Flush threshold for the formatting buffer.
pub const EMIT_BATCH_BYTES: usize = 32 * 1024;

/// Append one report line for `key` to `out`.
pub fn format_line(out: &mut Vec<u8>, key: &[u8], agg: &Aggregate) {
    out.extend_from_slice(key);
    // Writing into a Vec cannot fail.
    let _ = writeln!(
        out,
        ": {}/{}/{}",
        agg.min_tenths(),
        Tenths(agg.mean_tenths()),
        agg.max_tenths()
    );
}

/// Write the whole report to `sink`, then flush it.
///
/// `stations` must already be sorted by key; see
/// [`StationTable::into_sorted`](crate::aggregate::StationTable::into_sorted).
pub fn emit_report<K>(stations: &[(K, Aggregate)], sink: &dyn OutputSink) -> io::Result<()>
where
    K: AsRef<[u8]>,
{
    let mut buf = Vec::with_capacity(EMIT_BATCH_BYTES + 256);
    for (key, agg) in stations {
        debug_assert!(agg.count > 0, "empty aggregate in report");
        format_line(&mut buf, key.as_ref(), agg);
        if buf.len() >= EMIT_BATCH_BYTES {
            sink.write_all(&buf)?;
            buf.clear();
        }
    }
    if !buf.is_empty() {
        sink.write_all(&buf)?;
    }
    sink.flush()
}

/// Render the report into a `String` (lossy for non-UTF-8 keys).
pub fn render_report<K: AsRef<[u8]>>(stations: &[(K, Aggregate)]) -> String {
    let mut buf = Vec::new();
    for (key, agg) in stations {
        format_line(&mut buf, key.as_ref(), agg);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
