//! bulkpipe-api — HTTP surface for bulkpipe.
//!
//! Provides the axum router with the heartbeat and bulk-download
//! endpoints.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/ping` | Current server time as `{"timestamp": "<RFC 3339>"}` |
//! | GET | `/download` | Synthetic payload streamed in fixed-size chunks |
//!
//! Each download runs its own transfer loop in a spawned task that feeds
//! the response body through a one-slot channel, so a slow reader stalls
//! the generator instead of growing a buffer.

pub mod body;
pub mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use bulkpipe_core::PayloadSpec;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tracing::info;

/// Source of "now" for the heartbeat endpoint.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub payload: PayloadSpec,
    pub clock: Clock,
}

impl ApiState {
    /// Default payload size and the system clock.
    pub fn new() -> Self {
        Self::with_payload(PayloadSpec::default())
    }

    pub fn with_payload(payload: PayloadSpec) -> Self {
        Self {
            payload,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the complete router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/download", get(handlers::download))
        .with_state(state)
}

/// Serve the router on `listener` until `shutdown` resolves.
///
/// In-flight downloads are allowed to finish after the shutdown signal.
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, total = state.payload.total_size(), chunk = state.payload.chunk_size(), "server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
