//! # Chunking Module
//!
//! Turns a sequential byte stream into line-aligned chunks.
//!
//! ## Naming Convention
//!
//! - `chunk_size`: bytes requested per `read` call (excluding carry)
//! - `carry`: bytes after the last newline of the previous read
//! - `base_offset`: absolute stream offset of `chunk.data()[0]`
//!
//! ## Boundary Repair
//!
//! ```text
//! read N:    [ carry | new bytes ......\n tail ]
//!                                      ▲
//!                          last '\n' in new bytes
//!
//! emitted:   [ carry | new bytes ......\n ]       -> worker
//! carry:                                 [ tail ] -> prepended to read N+1
//! ```
//!
//! The carry never contains a newline (it is always the text after the last
//! one), so only the freshly read bytes are searched. A read with no newline
//! at all is carried whole and reading continues, which handles lines longer
//! than `chunk_size`.
//!
//! ## Correctness Invariants
//!
//! - **Lossless**: concatenating emitted chunks reproduces the stream exactly
//! - **Line-aligned**: every chunk but the last ends with `\n`; the last ends
//!   with `\n` or at end of stream
//! - **Monotonic offsets**: `base_offset` of chunk k+1 = `base_offset + len` of chunk k
//! - **Single writer**: only the reader thread touches the cursor and carry
//!
//! ## Buffer Recycling
//!
//! Workers return parsed chunk buffers through a [`BufferRecycler`]. Reuse is
//! opportunistic: an empty recycler means a fresh allocation, a full one means
//! the returned buffer is dropped. Peak memory stays bounded by the queue depth.

use std::io::{self, Read};
use std::mem;

use crossbeam_channel::{Receiver, Sender};
use memchr::memrchr;

use crate::error::PipelineError;

/// Default bytes per read call (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// A line-aligned byte range owned by exactly one consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    base_offset: u64,
    data: Vec<u8>,
}

impl Chunk {
    pub fn new(base_offset: u64, data: Vec<u8>) -> Self {
        Self { base_offset, data }
    }

    /// Absolute stream offset of `data()[0]`.
    #[inline]
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Give up the chunk and keep its allocation.
    pub fn into_buffer(self) -> Vec<u8> {
        self.data
    }
}

/// Best-effort return path for chunk buffers (workers -> reader).
#[derive(Clone, Debug)]
pub struct BufferRecycler {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl BufferRecycler {
    /// Recycler holding at most `cap` idle buffers.
    pub fn new(cap: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(cap.max(1));
        Self { tx, rx }
    }

    /// An empty buffer with at least `capacity` bytes reserved.
    pub fn take(&self, capacity: usize) -> Vec<u8> {
        match self.rx.try_recv() {
            Ok(mut buf) => {
                buf.clear();
                buf.reserve(capacity);
                buf
            }
            Err(_) => Vec::with_capacity(capacity),
        }
    }

    /// Offer a buffer back. Dropped if the recycler is full.
    pub fn give_back(&self, buf: Vec<u8>) {
        let _ = self.tx.try_send(buf);
    }

    /// Idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.rx.len()
    }
}

/// Sequential reader producing line-aligned [`Chunk`]s.
///
/// Not thread-safe by design: it is driven by a single producer.
pub struct ChunkReader<R> {
    input: R,
    chunk_size: usize,
    /// Bytes after the last newline seen so far.
    carry: Vec<u8>,
    /// Bytes consumed from `input`.
    bytes_read: u64,
    /// Offset of the next chunk to emit.
    next_offset: u64,
    eof: bool,
    recycler: Option<BufferRecycler>,
}

impl<R: Read> ChunkReader<R> {
    /// # Panics
    /// Panics if `chunk_size` is 0.
    pub fn new(input: R, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        Self {
            input,
            chunk_size,
            carry: Vec::new(),
            bytes_read: 0,
            next_offset: 0,
            eof: false,
            recycler: None,
        }
    }

    /// Draw chunk buffers from `recycler` instead of always allocating.
    pub fn with_recycler(mut self, recycler: BufferRecycler) -> Self {
        self.recycler = Some(recycler);
        self
    }

    /// Bytes consumed from the underlying stream so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Next line-aligned chunk, or `None` at end of stream.
    ///
    /// # Errors
    /// [`PipelineError::Read`] on any read failure other than `Interrupted`.
    /// The reader must not be used after an error.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, PipelineError> {
        loop {
            if self.eof {
                if self.carry.is_empty() {
                    return Ok(None);
                }
                let last = mem::take(&mut self.carry);
                return Ok(Some(self.emit(last)));
            }

            let carried = self.carry.len();
            let mut buf = self.take_buffer(carried + self.chunk_size);
            buf.extend_from_slice(&self.carry);
            self.carry.clear();
            buf.resize(carried + self.chunk_size, 0);

            let n = match read_some(&mut self.input, &mut buf[carried..]) {
                Ok(n) => n,
                Err(source) => {
                    return Err(PipelineError::Read {
                        offset: self.bytes_read,
                        source,
                    })
                }
            };
            buf.truncate(carried + n);
            self.bytes_read += n as u64;

            if n == 0 {
                self.eof = true;
                self.carry = buf;
                continue;
            }

            match memrchr(b'\n', &buf[carried..]) {
                Some(rel) => {
                    let cut = carried + rel + 1;
                    self.carry.extend_from_slice(&buf[cut..]);
                    buf.truncate(cut);
                    return Ok(Some(self.emit(buf)));
                }
                // Line longer than everything read so far; keep accumulating.
                None => self.carry = buf,
            }
        }
    }

    fn emit(&mut self, data: Vec<u8>) -> Chunk {
        let chunk = Chunk::new(self.next_offset, data);
        self.next_offset += chunk.len() as u64;
        chunk
    }

    fn take_buffer(&self, capacity: usize) -> Vec<u8> {
        match &self.recycler {
            Some(r) => r.take(capacity),
            None => Vec::with_capacity(capacity),
        }
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

/// Read until at least one byte arrives, EOF, or a real error.
///
/// `Interrupted` means no bytes were transferred and the stream position is
/// unchanged, so re-issuing the call cannot corrupt line tracking.
fn read_some<R: Read>(input: &mut R, dst: &mut [u8]) -> io::Result<usize> {
    loop {
        match input.read(dst) {
            Ok(n) => return Ok(n),
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
