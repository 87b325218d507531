//! # Fixed-Point Temperatures
//!
//! Readings are carried as integers scaled by 10 ("tenths") from the moment
//! they are parsed until the report is rendered. Accumulation is therefore
//! exact; the only rounding step is the mean at emission time.
//!
//! ## Accepted Shape
//!
//! ```text
//! [-]D[D].D      e.g.  0.0   -5.2   38.9   -99.9
//! ```
//!
//! One optional leading minus, one or two integer digits, a point, exactly
//! one fractional digit. [`decode_scaled`] trusts this shape; call
//! [`is_scaled_shape`] first when the input has not been validated.
//!
//! ## Rendering
//!
//! [`Tenths`] formats a scaled integer back into `[-]I.F`. For every value in
//! `[-99.9, 99.9]` produced by this module, `decode(Tenths(v).to_string()) == v`.

use std::fmt;

/// Longest accepted value text: `-DD.D`.
pub const MAX_VALUE_LEN: usize = 5;
/// Shortest accepted value text: `D.D`.
pub const MIN_VALUE_LEN: usize = 3;

/// Decode `[-]D[D].D` into the value multiplied by 10.
///
/// The point is skipped rather than interpreted: with exactly one fractional
/// digit, concatenating all digits already yields the x10 integer
/// (`"-12.3"` -> `-123`).
///
/// Input outside the accepted shape yields an unspecified value. Arithmetic
/// wraps, so garbage never panics.
#[inline]
pub fn decode_scaled(bytes: &[u8]) -> i16 {
    let mut v: i16 = 0;
    let mut negative = false;
    for &b in bytes {
        match b {
            b'-' => negative = true,
            b'.' => {}
            _ => {
                let digit = b.wrapping_sub(b'0') as i16;
                v = v.wrapping_mul(10).wrapping_add(digit);
            }
        }
    }
    if negative {
        v.wrapping_neg()
    } else {
        v
    }
}

/// Exact check for the `[-]D[D].D` shape.
#[inline]
pub fn is_scaled_shape(bytes: &[u8]) -> bool {
    let digits = match bytes.first() {
        Some(b'-') => &bytes[1..],
        _ => bytes,
    };
    match *digits {
        [i, b'.', f] => i.is_ascii_digit() && f.is_ascii_digit(),
        [i0, i1, b'.', f] => i0.is_ascii_digit() && i1.is_ascii_digit() && f.is_ascii_digit(),
        _ => false,
    }
}

/// Mean of `count` scaled readings summing to `sum`, in tenths, rounded
/// half-up (exact halves go toward positive infinity).
///
/// `count` must be non-zero.
#[inline]
pub fn round_mean_tenths(sum: i64, count: u64) -> i64 {
    debug_assert!(count > 0, "mean of an empty aggregate");
    let sum = sum as i128;
    let count = count as i128;
    // floor((sum + count/2) / count) == floor((2*sum + count) / (2*count))
    (2 * sum + count).div_euclid(2 * count) as i64
}

/// A scaled integer rendered with exactly one decimal digit.
///
/// ```
/// use brc_pipeline::record::Tenths;
/// assert_eq!(Tenths(-52).to_string(), "-5.2");
/// assert_eq!(Tenths(-5).to_string(), "-0.5");
/// assert_eq!(Tenths(0).to_string(), "0.0");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tenths(pub i64);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

impl From<i16> for Tenths {
    fn from(v: i16) -> Self {
        Tenths(v as i64)
    }
}
