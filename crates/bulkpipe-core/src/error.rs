//! Error types for the download path.

use std::fmt;

use thiserror::Error;

use crate::transfer::TransferState;

/// A chunk source failed for a reason other than end-of-stream.
///
/// Wraps a human-readable message. Reaching the end of the payload is
/// never reported through this type.
#[derive(Debug, Clone)]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SourceError {}

impl From<&str> for SourceError {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A chunk sink rejected a write.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving side went away (peer disconnected, body dropped).
    #[error("response channel closed")]
    Closed,

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal failure of one transfer.
///
/// Read and write failures carry the number of payload bytes the sink
/// accepted before the failure.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("chunk source failed after {delivered} bytes: {source}")]
    Read {
        delivered: u64,
        #[source]
        source: SourceError,
    },

    #[error("chunk write failed after {delivered} bytes: {source}")]
    Write {
        delivered: u64,
        #[source]
        source: SinkError,
    },

    /// The loop was already run once; a new transfer needs a new loop.
    #[error("transfer already {state}")]
    AlreadyRun { state: TransferState },
}

impl TransferError {
    /// Bytes accepted by the sink before the transfer failed.
    pub fn delivered(&self) -> u64 {
        match self {
            Self::Read { delivered, .. } | Self::Write { delivered, .. } => *delivered,
            Self::AlreadyRun { .. } => 0,
        }
    }
}
