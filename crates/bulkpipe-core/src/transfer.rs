//! Chunked transfer loop.
//!
//! [`TransferLoop`] pulls one chunk at a time from a [`ChunkSource`] and
//! pushes it into a [`ChunkSink`] until the source reports end-of-stream
//! or either side fails. A single reusable buffer of `chunk_size` bytes
//! backs every read.
//!
//! # State Machine
//!
//! ```text
//! NotStarted ──run()──► Streaming ──end-of-stream──► Completed
//!                           │
//!                           └── read or write error ──► Failed
//! ```
//!
//! `Completed` and `Failed` are terminal. A loop runs once; calling
//! [`TransferLoop::run`] again returns [`TransferError::AlreadyRun`].

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::error::{SinkError, SourceError, TransferError};
use crate::generator::{ChunkSource, StreamGenerator};
use crate::payload::PayloadSpec;

/// Destination for transfer chunks, usually an HTTP response body.
///
/// A write either hands the whole chunk to the receiver or fails. After a
/// failure the loop never writes again.
pub trait ChunkSink {
    fn write_chunk(&mut self, chunk: Bytes) -> impl Future<Output = Result<(), SinkError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    NotStarted,
    Streaming,
    Completed,
    Failed,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not_started",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferSummary {
    /// Payload bytes accepted by the sink.
    pub delivered: u64,
    /// Non-empty chunks written.
    pub chunks: u64,
    pub elapsed: Duration,
}

impl TransferSummary {
    /// Average throughput in MiB/s, or 0 for an instantaneous transfer.
    pub fn throughput_mib_s(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.delivered as f64 / (1024.0 * 1024.0) / secs
    }
}

/// Drains one chunk source into one sink.
#[derive(Debug)]
pub struct TransferLoop<S> {
    source: S,
    chunk_size: usize,
    declared_length: u64,
    state: TransferState,
    delivered: u64,
    chunks: u64,
}

impl TransferLoop<StreamGenerator> {
    /// A loop over a fresh [`StreamGenerator`] for `spec`.
    pub fn new(spec: PayloadSpec) -> Self {
        Self::with_source(StreamGenerator::new(spec), spec)
    }
}

impl<S: ChunkSource> TransferLoop<S> {
    /// A loop over an arbitrary source that promises `spec.total_size()`
    /// bytes in reads of at most `spec.chunk_size()`.
    pub fn with_source(source: S, spec: PayloadSpec) -> Self {
        Self {
            source,
            chunk_size: spec.chunk_size(),
            declared_length: spec.total_size(),
            state: TransferState::NotStarted,
            delivered: 0,
            chunks: 0,
        }
    }

    /// Total body size to announce before the first byte is written.
    pub fn declared_length(&self) -> u64 {
        self.declared_length
    }

    /// Whether the connection should be kept open after the transfer.
    pub fn keep_alive(&self) -> bool {
        true
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Run the transfer to completion or first failure.
    ///
    /// Each iteration reads one chunk, writes it if non-empty, and stops
    /// after the read that reports end-of-stream. There are no retries: a
    /// failed read or write leaves the loop in [`TransferState::Failed`].
    pub async fn run<K: ChunkSink>(&mut self, sink: &mut K) -> Result<TransferSummary, TransferError> {
        if self.state != TransferState::NotStarted {
            return Err(TransferError::AlreadyRun { state: self.state });
        }

        let started = Instant::now();
        self.transition(TransferState::Streaming);

        let mut buf = BytesMut::with_capacity(self.chunk_size);
        loop {
            // Reclaims the previous allocation once the last chunk is dropped.
            buf.resize(self.chunk_size, 0);

            let outcome = match self.source.read(&mut buf[..]) {
                Ok(outcome) => outcome,
                Err(source) => return Err(self.fail_read(source)),
            };
            if outcome.written > buf.len() {
                let source = SourceError::new(format!(
                    "source reported {} bytes for a {}-byte buffer",
                    outcome.written,
                    buf.len()
                ));
                return Err(self.fail_read(source));
            }

            if outcome.written > 0 {
                let chunk = buf.split_to(outcome.written).freeze();
                if let Err(source) = sink.write_chunk(chunk).await {
                    self.transition(TransferState::Failed);
                    return Err(TransferError::Write {
                        delivered: self.delivered,
                        source,
                    });
                }
                self.delivered += outcome.written as u64;
                self.chunks += 1;
            }

            if outcome.end {
                self.transition(TransferState::Completed);
                return Ok(TransferSummary {
                    delivered: self.delivered,
                    chunks: self.chunks,
                    elapsed: started.elapsed(),
                });
            }
        }
    }

    fn fail_read(&mut self, source: SourceError) -> TransferError {
        self.transition(TransferState::Failed);
        TransferError::Read {
            delivered: self.delivered,
            source,
        }
    }

    fn transition(&mut self, next: TransferState) {
        debug!(from = %self.state, to = %next, delivered = self.delivered, "transfer state change");
        self.state = next;
    }
}
