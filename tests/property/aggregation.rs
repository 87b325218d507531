//! End-to-end aggregation against a straightforward reference fold.

use brc_pipeline::record::round_mean_tenths;
use brc_pipeline::{aggregate, run, PipelineConfig, SplitStrategy, VecSink};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::io::Cursor;

fn reading() -> impl Strategy<Value = i16> {
    -999i16..=999
}

fn render(v: i16) -> String {
    let sign = if v < 0 { "-" } else { "" };
    let abs = v.unsigned_abs();
    format!("{sign}{}.{}", abs / 10, abs % 10)
}

fn rows() -> impl Strategy<Value = Vec<(String, i16)>> {
    prop::collection::vec(("[A-Z][a-z]{0,6}( [A-Z][a-z]{0,4})?", reading()), 0..300)
}

fn to_input(rows: &[(String, i16)], trailing_newline: bool) -> Vec<u8> {
    let mut out = String::new();
    for (i, (key, v)) in rows.iter().enumerate() {
        out.push_str(key);
        out.push(';');
        out.push_str(&render(*v));
        if trailing_newline || i + 1 < rows.len() {
            out.push('\n');
        }
    }
    out.into_bytes()
}

/// (min, sum, max, count) per key.
fn reference(rows: &[(String, i16)]) -> BTreeMap<Vec<u8>, (i64, i64, i64, u64)> {
    let mut map = BTreeMap::new();
    for (key, v) in rows {
        let v = *v as i64;
        let e = map
            .entry(key.as_bytes().to_vec())
            .or_insert((i64::MAX, 0, i64::MIN, 0));
        e.0 = e.0.min(v);
        e.1 += v;
        e.2 = e.2.max(v);
        e.3 += 1;
    }
    map
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matches_reference_fold(
        rows in rows(),
        workers in 1usize..6,
        chunk_size in 1usize..128,
        trailing_newline in any::<bool>(),
    ) {
        let cfg = PipelineConfig { chunk_size, ..PipelineConfig::with_workers(workers) };
        let input = to_input(&rows, trailing_newline);
        let result = aggregate(Cursor::new(input), &cfg).unwrap();
        let expected = reference(&rows);

        prop_assert_eq!(result.stations.len(), expected.len());
        prop_assert_eq!(result.stats.rows, rows.len() as u64);
        for ((key, agg), (ekey, &(min, sum, max, count))) in result.stations.iter().zip(&expected) {
            prop_assert_eq!(key.as_ref(), ekey.as_slice());
            prop_assert_eq!(agg.min as i64, min);
            prop_assert_eq!(agg.max as i64, max);
            prop_assert_eq!(agg.sum, sum);
            prop_assert_eq!(agg.count, count);
            prop_assert!(count >= 1);
            let mean = round_mean_tenths(sum, count);
            prop_assert!(min <= mean && mean <= max);
        }
    }

    #[test]
    fn report_is_independent_of_chunking_and_split(
        rows in rows(),
        workers in 1usize..5,
        chunk_size in 1usize..64,
    ) {
        let input = to_input(&rows, true);
        let baseline = {
            let sink = VecSink::new();
            run(Cursor::new(input.clone()), &PipelineConfig {
                chunk_size: input.len().max(1),
                ..PipelineConfig::with_workers(1)
            }, &sink).unwrap();
            sink.take_string()
        };
        for split in [SplitStrategy::BackwardScan, SplitStrategy::FixedProbe] {
            let sink = VecSink::new();
            let cfg = PipelineConfig {
                chunk_size,
                split,
                ..PipelineConfig::with_workers(workers)
            };
            run(Cursor::new(input.clone()), &cfg, &sink).unwrap();
            prop_assert_eq!(&sink.take_string(), &baseline);
        }
    }
}
