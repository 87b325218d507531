//! Shared helpers for unit tests.

use proptest::prelude::*;

pub fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
}

fn is_ci() -> bool {
    std::env::var_os("CI").is_some()
}

/// Proptest case count: `PROPTEST_CASES` wins, CI runs `default`, local runs
/// stay small.
pub fn proptest_cases(default: u32) -> u32 {
    if let Some(value) = env_u32("PROPTEST_CASES") {
        return value.max(1);
    }
    if is_ci() {
        return default.max(1);
    }
    default.clamp(1, 32)
}

/// Render `tenths` as measurement text (`-12.3`).
pub fn value_text(tenths: i16) -> String {
    crate::record::Tenths::from(tenths).to_string()
}

/// Strategy for one well-formed record line (with trailing newline).
pub fn record_line() -> impl Strategy<Value = String> {
    ("[A-Za-z][A-Za-z .']{0,11}", -999i16..=999)
        .prop_map(|(key, v)| format!("{key};{}\n", value_text(v)))
}

/// Strategy for a whole input file of well-formed lines.
pub fn measurements(max_lines: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(record_line(), 0..max_lines).prop_map(|lines| lines.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{decode_scaled, is_scaled_shape, split_record, Records, SplitStrategy};
    use crate::scheduler::chunking::ChunkReader;
    use crate::{aggregate, PipelineConfig};
    use std::io::Cursor;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(proptest_cases(64)))]

        #[test]
        fn generated_lines_are_well_formed(line in record_line()) {
            let body = line.strip_suffix('\n').unwrap().as_bytes();
            let (_, value) = split_record(body, SplitStrategy::FixedProbe).unwrap();
            prop_assert!(is_scaled_shape(value));
        }

        #[test]
        fn worker_count_does_not_change_result(
            input in measurements(200),
            workers in 1usize..6,
            chunk_size in 1usize..64,
        ) {
            let one = aggregate(Cursor::new(input.clone()), &PipelineConfig {
                chunk_size,
                ..PipelineConfig::with_workers(1)
            }).unwrap();
            let many = aggregate(Cursor::new(input), &PipelineConfig {
                chunk_size,
                ..PipelineConfig::with_workers(workers)
            }).unwrap();
            prop_assert_eq!(one.stations, many.stations);
        }

        #[test]
        fn chunk_rows_equal_file_rows(input in measurements(100), chunk_size in 1usize..40) {
            let whole: Vec<_> = Records::new(input.as_bytes())
                .map(|(_, line)| line.to_vec())
                .collect();
            let mut chunked = Vec::new();
            for chunk in ChunkReader::new(Cursor::new(input.as_bytes().to_vec()), chunk_size) {
                let chunk = chunk.unwrap();
                chunked.extend(Records::new(chunk.data()).map(|(_, line)| line.to_vec()));
            }
            prop_assert_eq!(whole, chunked);
        }

        #[test]
        fn value_text_decodes_back(v in -999i16..=999) {
            prop_assert_eq!(decode_scaled(value_text(v).as_bytes()), v);
        }
    }
}
