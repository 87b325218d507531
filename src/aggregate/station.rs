//! Per-key running statistics.

use crate::record::{round_mean_tenths, Tenths};

/// Running min/max/sum/count for one station, in tenths.
///
/// ## Width
///
/// - `min`/`max`: `i16`, the decoder's output width
/// - `sum`: `i64`, four times the reading width; one key would need
///   ~9.2e15 readings of 99.9 to overflow
/// - `count`: `u64`
///
/// ## Invariants
///
/// An aggregate held by a table always has `count >= 1` and
/// `min <= max`. [`Aggregate::EMPTY`] is the fold identity only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aggregate {
    pub min: i16,
    pub max: i16,
    pub sum: i64,
    pub count: u64,
}

impl Aggregate {
    /// Identity for [`Aggregate::add`] and [`Aggregate::merge`].
    pub const EMPTY: Aggregate = Aggregate {
        min: i16::MAX,
        max: i16::MIN,
        sum: 0,
        count: 0,
    };

    /// Aggregate of a single reading.
    #[inline]
    pub const fn from_reading(v: i16) -> Self {
        Self {
            min: v,
            max: v,
            sum: v as i64,
            count: 1,
        }
    }

    #[inline]
    pub fn add(&mut self, v: i16) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self.sum += v as i64;
        self.count += 1;
    }

    /// Fold another aggregate for the same key into this one.
    #[inline]
    pub fn merge(&mut self, other: &Aggregate) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Mean in tenths, rounded half-up. Requires `count >= 1`.
    #[inline]
    pub fn mean_tenths(&self) -> i64 {
        round_mean_tenths(self.sum, self.count)
    }

    pub fn min_tenths(&self) -> Tenths {
        Tenths::from(self.min)
    }

    pub fn max_tenths(&self) -> Tenths {
        Tenths::from(self.max)
    }
}

impl Default for Aggregate {
    fn default() -> Self {
        Self::EMPTY
    }
}
