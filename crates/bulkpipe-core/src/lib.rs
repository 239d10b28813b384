//! bulkpipe-core — the bulk-download path and shared types for bulkpipe.
//!
//! The download path is two pieces: a bounded [`StreamGenerator`] that
//! produces a synthetic payload of a fixed total size, and a
//! [`TransferLoop`] that drains a generator into a [`ChunkSink`] one chunk
//! at a time.
//!
//! # Architecture
//!
//! ```text
//! TransferLoop
//!   ├── ChunkSource (StreamGenerator)
//!   │   └── read(buf) → ReadOutcome { written, end }
//!   ├── reusable BytesMut buffer (chunk_size)
//!   └── ChunkSink
//!       └── write_chunk(Bytes) → Result<(), SinkError>
//! ```
//!
//! # Byte Accounting
//!
//! The generator tracks the bytes it has actually handed out. The final
//! read is clamped to the remainder, so the sum of all reads is exactly
//! the declared total and end-of-stream is reported on the read that
//! delivers the last byte (and on every read after it).

pub mod config;
pub mod error;
pub mod generator;
pub mod heartbeat;
pub mod payload;
pub mod transfer;

pub use config::{BulkpipeConfig, ProbeSection, ServerSection};
pub use error::{SinkError, SourceError, TransferError};
pub use generator::{ChunkSource, ReadOutcome, StreamGenerator};
pub use heartbeat::Heartbeat;
pub use payload::{PayloadSpec, DEFAULT_CHUNK_SIZE, DEFAULT_TOTAL_SIZE, FILLER_BYTE};
pub use transfer::{ChunkSink, TransferLoop, TransferState, TransferSummary};
