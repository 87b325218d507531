//! # Line Splitting
//!
//! Splits one `key;value` record (newline already stripped) into its key and
//! value byte ranges, and walks the records of a line-aligned chunk.
//!
//! ## Strategies
//!
//! | Strategy | Cost | Precondition |
//! |----------|------|--------------|
//! | [`SplitStrategy::BackwardScan`] | `memrchr` over the line | key has no `;` |
//! | [`SplitStrategy::FixedProbe`] | at most 3 byte compares | value is 3-5 bytes (`[-]D[D].D`) |
//!
//! The probe checks `len-4`, `len-5`, `len-6` in that order. If the value
//! width assumption is violated no probe matches and the split fails; it
//! never falls back silently and never indexes outside the line.

use memchr::{memchr, memrchr};

/// Field delimiter between key and value.
pub const DELIMITER: u8 = b';';

/// How [`split_record`] locates the delimiter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Search backward from the end of the line for the last `;`.
    #[default]
    BackwardScan,
    /// Probe fixed offsets from the end of the line (value width 3-5).
    FixedProbe,
}

impl SplitStrategy {
    /// Parse a CLI spelling (`scan` or `probe`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "scan" => Some(SplitStrategy::BackwardScan),
            "probe" => Some(SplitStrategy::FixedProbe),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SplitStrategy::BackwardScan => "scan",
            SplitStrategy::FixedProbe => "probe",
        }
    }
}

/// Split `line` into `(key, value)` around the delimiter.
///
/// Returns `None` when the delimiter cannot be found with `strategy`.
#[inline]
pub fn split_record(line: &[u8], strategy: SplitStrategy) -> Option<(&[u8], &[u8])> {
    let idx = match strategy {
        SplitStrategy::BackwardScan => memrchr(DELIMITER, line)?,
        SplitStrategy::FixedProbe => probe_delimiter(line)?,
    };
    Some((&line[..idx], &line[idx + 1..]))
}

#[inline]
fn probe_delimiter(line: &[u8]) -> Option<usize> {
    let len = line.len();
    [4usize, 5, 6]
        .into_iter()
        .filter_map(|back| len.checked_sub(back))
        .find(|&idx| line[idx] == DELIMITER)
}

/// Iterator over the records of a line-aligned chunk.
///
/// Yields `(offset, line)` where `offset` is the position of the first byte
/// of `line` inside the chunk and `line` excludes its `\n`. Empty lines are
/// skipped. A final line without a trailing newline is still yielded.
pub struct Records<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Records<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = (usize, &'a [u8]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.buf.len() {
            let start = self.pos;
            let rest = &self.buf[start..];
            let end = memchr(b'\n', rest).unwrap_or(rest.len());
            self.pos = start + end + 1;
            if end > 0 {
                return Some((start, &rest[..end]));
            }
        }
        None
    }
}
