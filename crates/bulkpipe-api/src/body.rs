//! Channel-backed response body.
//!
//! The transfer task owns a [`ChannelSink`]; the HTTP response owns the
//! matching [`ChunkStream`]. The channel holds a single chunk, so the
//! task can be at most one chunk ahead of the socket. When the client
//! disconnects, hyper drops the body, the receiver goes with it, and the
//! next `write_chunk` fails with [`SinkError::Closed`].

use std::pin::Pin;
use std::task::{Context, Poll};

use bulkpipe_core::{ChunkSink, SinkError, TransferError};
use bytes::Bytes;
use futures_core::Stream;
use tokio::sync::mpsc;

/// Chunks in flight between the transfer task and the response body.
pub const CHANNEL_CAPACITY: usize = 1;

type BodyItem = Result<Bytes, TransferError>;

/// Create a connected sink/stream pair.
pub fn channel() -> (ChannelSink, ChunkStream) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    (ChannelSink { tx }, ChunkStream { head: None, rx })
}

/// Sending half: the transfer loop writes here.
pub struct ChannelSink {
    tx: mpsc::Sender<BodyItem>,
}

impl ChannelSink {
    /// Forward a transfer failure to the body so the response ends with an
    /// error instead of looking complete. A no-op if the body is gone.
    pub async fn abort(&self, err: TransferError) {
        let _ = self.tx.send(Err(err)).await;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl ChunkSink for ChannelSink {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        self.tx.send(Ok(chunk)).await.map_err(|_| SinkError::Closed)
    }
}

/// Receiving half, usable as an axum body via `Body::from_stream`.
pub struct ChunkStream {
    /// A chunk taken off the channel by [`prime`](Self::prime).
    head: Option<Bytes>,
    rx: mpsc::Receiver<BodyItem>,
}

/// What [`ChunkStream::prime`] found at the front of the channel.
#[derive(Debug)]
pub enum Primed {
    /// The first chunk arrived; more may follow.
    Streaming,
    /// The transfer finished without producing a byte.
    Empty,
}

impl ChunkStream {
    /// Wait for the first item so a failure that happens before any byte
    /// is produced can still become a proper error response.
    pub async fn prime(&mut self) -> Result<Primed, TransferError> {
        match self.rx.recv().await {
            Some(Ok(chunk)) => {
                self.head = Some(chunk);
                Ok(Primed::Streaming)
            }
            Some(Err(e)) => Err(e),
            None => Ok(Primed::Empty),
        }
    }
}

impl Stream for ChunkStream {
    type Item = BodyItem;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let Some(chunk) = this.head.take() {
            return Poll::Ready(Some(Ok(chunk)));
        }
        this.rx.poll_recv(cx)
    }
}
