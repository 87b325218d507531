//! Boundary repair: chunks reassemble to the input and end on line breaks.

use brc_pipeline::scheduler::ChunkReader;
use proptest::prelude::*;
use std::io::Cursor;

fn text_with_lines() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            4 => b'a'..=b'z',
            1 => Just(b'\n'),
            1 => Just(b';'),
        ],
        0..512,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn chunks_concatenate_to_input(input in text_with_lines(), chunk_size in 1usize..96) {
        let mut joined = Vec::with_capacity(input.len());
        let mut expected_offset = 0u64;
        for chunk in ChunkReader::new(Cursor::new(input.clone()), chunk_size) {
            let chunk = chunk.unwrap();
            prop_assert!(!chunk.data().is_empty());
            prop_assert_eq!(chunk.base_offset(), expected_offset);
            expected_offset += chunk.data().len() as u64;
            joined.extend_from_slice(chunk.data());
        }
        prop_assert_eq!(joined, input);
    }

    #[test]
    fn only_the_last_chunk_may_lack_a_newline(
        input in text_with_lines(),
        chunk_size in 1usize..96,
    ) {
        let chunks: Vec<Vec<u8>> = ChunkReader::new(Cursor::new(input), chunk_size)
            .map(|c| c.unwrap().data().to_vec())
            .collect();
        if let Some((_, head)) = chunks.split_last() {
            for chunk in head {
                prop_assert_eq!(chunk.last(), Some(&b'\n'));
            }
        }
    }
}
