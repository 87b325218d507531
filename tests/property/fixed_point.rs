//! Fixed-point decode and render agree over the whole value domain.

use brc_pipeline::record::{decode_scaled, is_scaled_shape, round_mean_tenths, Tenths};
use proptest::prelude::*;

/// Exhaustive: every representable reading survives render then decode.
#[test]
fn every_reading_decodes_to_itself() {
    for v in -999i16..=999 {
        let text = Tenths::from(v).to_string();
        assert!(is_scaled_shape(text.as_bytes()), "{text}");
        assert_eq!(decode_scaled(text.as_bytes()), v, "{text}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn mean_lies_between_min_and_max(values in prop::collection::vec(-999i16..=999, 1..64)) {
        let sum: i64 = values.iter().map(|&v| v as i64).sum();
        let min = *values.iter().min().unwrap() as i64;
        let max = *values.iter().max().unwrap() as i64;
        let mean = round_mean_tenths(sum, values.len() as u64);
        prop_assert!(min <= mean && mean <= max, "min={min} mean={mean} max={max}");
    }

    #[test]
    fn shape_check_rejects_extra_digits(int in 100u32..1000, frac in 0u32..10) {
        let text = format!("{int}.{frac}");
        prop_assert!(!is_scaled_shape(text.as_bytes()));
    }
}
