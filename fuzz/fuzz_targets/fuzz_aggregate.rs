#![no_main]

use brc_pipeline::{aggregate, PipelineConfig, PipelineError, SplitStrategy};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let (knobs, input) = data.split_at(2);
    let workers = (knobs[0] as usize % 4) + 1;
    let chunk_size = (knobs[1] as usize % 48) + 1;

    // Arbitrary bytes: either a clean result or a malformed-record error,
    // and the same outcome for every chunking.
    let small = PipelineConfig {
        chunk_size,
        split: SplitStrategy::BackwardScan,
        ..PipelineConfig::with_workers(workers)
    };
    let whole = PipelineConfig {
        chunk_size: input.len().max(1),
        split: SplitStrategy::BackwardScan,
        ..PipelineConfig::with_workers(1)
    };

    match (
        aggregate(Cursor::new(input), &small),
        aggregate(Cursor::new(input), &whole),
    ) {
        (Ok(a), Ok(b)) => {
            assert_eq!(a.stations, b.stations);
            for (_, agg) in &a.stations {
                let mean = agg.mean_tenths();
                assert!(agg.count >= 1);
                assert!(agg.min as i64 <= mean && mean <= agg.max as i64);
            }
        }
        (Err(PipelineError::MalformedRecord { .. }), Err(PipelineError::MalformedRecord { .. })) => {}
        (a, b) => panic!("chunking changed the outcome: {a:?} vs {b:?}"),
    }
});
