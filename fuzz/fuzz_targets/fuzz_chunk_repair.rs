#![no_main]

use brc_pipeline::scheduler::ChunkReader;
use libfuzzer_sys::fuzz_target;
use std::io::{self, Read};

/// Reader that returns at most the next planned length per call.
struct Jagged<'a> {
    data: &'a [u8],
    plan: &'a [u8],
    step: usize,
}

impl Read for Jagged<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = if self.plan.is_empty() {
            buf.len()
        } else {
            (self.plan[self.step % self.plan.len()] as usize).max(1)
        };
        self.step += 1;
        let n = want.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the chunk size, next few bytes shape short reads.
    let chunk_size = (data[0] as usize % 64) + 1;
    let plan_len = (data[1] as usize % 8).min(data.len() - 2);
    let (plan, input) = data[2..].split_at(plan_len);

    let reader = Jagged {
        data: input,
        plan,
        step: 0,
    };

    let mut joined = Vec::with_capacity(input.len());
    let mut chunks = Vec::new();
    for chunk in ChunkReader::new(reader, chunk_size) {
        let chunk = chunk.expect("in-memory reads never fail");
        assert_eq!(chunk.base_offset(), joined.len() as u64);
        assert!(!chunk.data().is_empty());
        joined.extend_from_slice(chunk.data());
        chunks.push(chunk);
    }

    assert_eq!(joined, input, "chunks must reassemble to the input");
    if let Some((_, head)) = chunks.split_last() {
        for chunk in head {
            assert_eq!(chunk.data().last(), Some(&b'\n'), "chunk not line-aligned");
        }
    }
});
