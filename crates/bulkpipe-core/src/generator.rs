//! Bounded synthetic byte stream.
//!
//! [`StreamGenerator`] hands out a fixed number of filler bytes through
//! repeated reads into caller-supplied buffers. Each instance produces
//! exactly one finite sequence; a new transfer needs a new generator.

use crate::error::SourceError;
use crate::payload::{PayloadSpec, FILLER_BYTE};

/// Result of a single successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Bytes written to the front of the buffer.
    pub written: usize,
    /// No more bytes follow this read.
    pub end: bool,
}

impl ReadOutcome {
    pub fn new(written: usize, end: bool) -> Self {
        Self { written, end }
    }
}

/// Anything that can fill buffers for a [`TransferLoop`](crate::TransferLoop).
///
/// Reaching the end of the data is reported through [`ReadOutcome::end`],
/// never as an error.
pub trait ChunkSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, SourceError>;
}

/// Produces `total_size` filler bytes, at most `chunk_size` per read.
#[derive(Debug)]
pub struct StreamGenerator {
    total_size: u64,
    chunk_size: usize,
    delivered: u64,
}

impl StreamGenerator {
    pub fn new(spec: PayloadSpec) -> Self {
        Self {
            total_size: spec.total_size(),
            chunk_size: spec.chunk_size(),
            delivered: 0,
        }
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Bytes handed out so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn remaining(&self) -> u64 {
        self.total_size - self.delivered
    }

    pub fn is_exhausted(&self) -> bool {
        self.delivered == self.total_size
    }

    /// Fill the front of `buf` with the next slice of the payload.
    ///
    /// Writes `min(buf.len(), chunk_size, remaining)` bytes. Once the
    /// payload is exhausted every call returns `(0, end)`.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> ReadOutcome {
        let remaining = self.remaining();
        if remaining == 0 {
            return ReadOutcome::new(0, true);
        }

        // `remaining` may exceed usize on 32-bit targets; clamp in u64 first.
        let limit = buf.len().min(self.chunk_size) as u64;
        let n = limit.min(remaining) as usize;

        buf[..n].fill(FILLER_BYTE);
        self.delivered += n as u64;

        ReadOutcome::new(n, self.is_exhausted())
    }
}

impl ChunkSource for StreamGenerator {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, SourceError> {
        Ok(self.read_chunk(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(generator: &mut StreamGenerator, capacity: usize) -> Vec<ReadOutcome> {
        let mut buf = vec![0u8; capacity];
        let mut reads = Vec::new();
        loop {
            let outcome = generator.read_chunk(&mut buf);
            reads.push(outcome);
            if outcome.end {
                break;
            }
        }
        reads
    }

    fn pairs(reads: &[ReadOutcome]) -> Vec<(usize, bool)> {
        reads.iter().map(|r| (r.written, r.end)).collect()
    }

    #[test]
    fn partial_final_chunk() {
        let mut generator = StreamGenerator::new(PayloadSpec::new(25, 10));
        let reads = drain(&mut generator, 10);

        assert_eq!(pairs(&reads), vec![(10, false), (10, false), (5, true)]);
        assert_eq!(generator.delivered(), 25);
    }

    #[test]
    fn exact_multiple_ends_on_last_full_chunk() {
        let mut generator = StreamGenerator::new(PayloadSpec::new(20, 10));
        let reads = drain(&mut generator, 10);

        assert_eq!(pairs(&reads), vec![(10, false), (10, true)]);

        let mut buf = [0u8; 10];
        assert_eq!(generator.read_chunk(&mut buf), ReadOutcome::new(0, true));
    }

    #[test]
    fn end_repeats_after_exhaustion() {
        let mut generator = StreamGenerator::new(PayloadSpec::new(7, 4));
        drain(&mut generator, 4);

        let mut buf = [0xFFu8; 4];
        for _ in 0..3 {
            assert_eq!(generator.read_chunk(&mut buf), ReadOutcome::new(0, true));
        }
        // Untouched once exhausted.
        assert_eq!(buf, [0xFF; 4]);
    }

    #[test]
    fn empty_payload_ends_immediately() {
        let mut generator = StreamGenerator::new(PayloadSpec::new(0, 10));
        let mut buf = [0u8; 10];
        assert_eq!(generator.read_chunk(&mut buf), ReadOutcome::new(0, true));
    }

    #[test]
    fn sum_of_reads_equals_total_for_many_shapes() {
        for total in [0u64, 1, 9, 10, 11, 99, 100, 101, 1000, 4097] {
            for chunk in [1usize, 3, 10, 64, 4096] {
                let mut generator = StreamGenerator::new(PayloadSpec::new(total, chunk));
                let reads = drain(&mut generator, chunk);

                let sum: u64 = reads.iter().map(|r| r.written as u64).sum();
                assert_eq!(sum, total, "total={total} chunk={chunk}");

                let ends = reads.iter().filter(|r| r.end).count();
                assert_eq!(ends, 1, "end reported once in drained sequence");

                if total > 0 {
                    let last = reads.last().unwrap();
                    let expected_last = match total % chunk as u64 {
                        0 => chunk,
                        rem => rem as usize,
                    };
                    assert_eq!(last.written, expected_last, "total={total} chunk={chunk}");
                    assert!(reads[..reads.len() - 1].iter().all(|r| r.written == chunk));
                }
            }
        }
    }

    #[test]
    fn never_exceeds_buffer_capacity() {
        // Buffer smaller than the chunk size.
        let mut generator = StreamGenerator::new(PayloadSpec::new(100, 64));
        let reads = drain(&mut generator, 16);

        assert!(reads.iter().all(|r| r.written <= 16));
        let sum: usize = reads.iter().map(|r| r.written).sum();
        assert_eq!(sum, 100);
    }

    #[test]
    fn never_exceeds_chunk_size_with_large_buffer() {
        let mut generator = StreamGenerator::new(PayloadSpec::new(100, 30));
        let reads = drain(&mut generator, 1024);

        assert_eq!(pairs(&reads), vec![(30, false), (30, false), (30, false), (10, true)]);
    }

    #[test]
    fn fills_with_filler_byte() {
        let mut generator = StreamGenerator::new(PayloadSpec::new(5, 8));
        let mut buf = [0u8; 8];
        let outcome = generator.read_chunk(&mut buf);

        assert_eq!(outcome, ReadOutcome::new(5, true));
        assert!(buf[..5].iter().all(|&b| b == FILLER_BYTE));
        assert!(buf[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn chunk_source_never_fails() {
        let mut generator = StreamGenerator::new(PayloadSpec::new(3, 2));
        let mut buf = [0u8; 2];
        let first = ChunkSource::read(&mut generator, &mut buf).unwrap();
        assert_eq!(first, ReadOutcome::new(2, false));
        let second = ChunkSource::read(&mut generator, &mut buf).unwrap();
        assert_eq!(second, ReadOutcome::new(1, true));
    }
}
