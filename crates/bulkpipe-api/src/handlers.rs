//! HTTP handlers.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bulkpipe_core::{ChunkSource, Heartbeat, TransferLoop};
use tracing::{debug, info, warn};

use crate::body::{self, Primed};
use crate::ApiState;

/// Error body for failures that happen before any payload byte is sent.
#[derive(serde::Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: msg.to_string(),
        }),
    )
        .into_response()
}

// ── Heartbeat ──────────────────────────────────────────────────

/// GET /ping
pub async fn ping(State(state): State<ApiState>) -> Json<Heartbeat> {
    let heartbeat = Heartbeat::at((state.clock)());
    debug!(timestamp = %heartbeat.timestamp, "heartbeat");
    Json(heartbeat)
}

// ── Download ───────────────────────────────────────────────────

/// GET /download
pub async fn download(State(state): State<ApiState>) -> Response {
    stream_transfer(TransferLoop::new(state.payload)).await
}

/// Run `transfer` in its own task and stream its chunks as the response.
///
/// Headers are built from the loop's declared length before the body is
/// handed to hyper. If the loop fails before producing its first chunk the
/// client gets a 500; later failures end the body with an error, which
/// makes hyper cut the connection short of the declared length.
pub async fn stream_transfer<S>(mut transfer: TransferLoop<S>) -> Response
where
    S: ChunkSource + Send + 'static,
{
    let declared = transfer.declared_length();
    let keep_alive = transfer.keep_alive();
    let (mut sink, mut stream) = body::channel();

    tokio::spawn(async move {
        info!(total = declared, "download started");
        match transfer.run(&mut sink).await {
            Ok(summary) => {
                info!(
                    bytes = summary.delivered,
                    chunks = summary.chunks,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    mib_per_sec = summary.throughput_mib_s(),
                    "download completed"
                );
            }
            Err(e) => {
                warn!(error = %e, delivered = e.delivered(), total = declared, "download failed");
                sink.abort(e).await;
            }
        }
    });

    match stream.prime().await {
        Ok(Primed::Streaming) => {}
        Ok(Primed::Empty) => debug!("empty payload, no chunks to stream"),
        Err(e) => return error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }

    let mut response = Response::new(Body::from_stream(stream));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(declared));
    if keep_alive {
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    }
    response
}
