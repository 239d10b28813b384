//! Probe error types.

use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

/// Errors from a single probe or download check.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("request failed: {0}")]
    Request(#[source] hyper::Error),

    #[error("failed to build request: {0}")]
    Build(#[from] http::Error),

    #[error("server answered {0}")]
    Status(StatusCode),

    #[error("body read failed: {0}")]
    Body(#[source] hyper::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("received {received} bytes, server declared {declared}")]
    LengthMismatch { declared: u64, received: u64 },
}
