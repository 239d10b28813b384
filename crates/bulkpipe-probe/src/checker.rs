//! Single heartbeat probe.
//!
//! Opens a fresh HTTP/1.1 connection per probe, so every sample includes
//! connection setup, the way a plain `GET` from a new client would.

use std::time::{Duration, Instant};

use bulkpipe_core::Heartbeat;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{HOST, USER_AGENT};
use http::{Response, Uri};
use http_body_util::{BodyExt, Empty};
use hyper::body::Incoming;
use hyper_util::rt::TokioIo;
use tracing::debug;

use crate::error::ProbeError;

const USER_AGENT_VALUE: &str = "bulkpipe-probe/0.1";

/// One successful heartbeat round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSample {
    /// Wall-clock time from connect to the last body byte.
    pub rtt: Duration,
    /// Server clock reading, if the body was a valid heartbeat.
    pub server_time: Option<DateTime<Utc>>,
}

/// `<base>/ping`
pub fn heartbeat_uri(base: &str) -> Result<Uri, ProbeError> {
    endpoint_uri(base, "/ping")
}

/// `<base>/download`
pub fn download_uri(base: &str) -> Result<Uri, ProbeError> {
    endpoint_uri(base, "/download")
}

fn endpoint_uri(base: &str, suffix: &str) -> Result<Uri, ProbeError> {
    let joined = format!("{}{suffix}", base.trim_end_matches('/'));
    let uri: Uri = joined
        .parse()
        .map_err(|e| ProbeError::InvalidUrl(format!("{joined}: {e}")))?;

    match uri.scheme_str() {
        Some("http") => {}
        Some(other) => return Err(ProbeError::UnsupportedScheme(other.to_string())),
        None => return Err(ProbeError::InvalidUrl(format!("{joined}: missing scheme"))),
    }
    if uri.host().is_none() {
        return Err(ProbeError::InvalidUrl(format!("{joined}: missing host")));
    }
    Ok(uri)
}

/// Connect, send `GET uri`, and return the response once headers arrive.
///
/// Non-2xx statuses are turned into [`ProbeError::Status`].
pub(crate) async fn send_get(uri: &Uri) -> Result<Response<Incoming>, ProbeError> {
    let host = uri
        .host()
        .ok_or_else(|| ProbeError::InvalidUrl(uri.to_string()))?;
    let port = uri.port_u16().unwrap_or(80);
    let ip_host = host.trim_start_matches('[').trim_end_matches(']');

    let stream = tokio::net::TcpStream::connect((ip_host, port))
        .await
        .map_err(ProbeError::Connect)?;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(ProbeError::Handshake)?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "probe connection closed with error");
        }
    });

    let authority = uri.authority().map(|a| a.as_str()).unwrap_or(host);
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let req = http::Request::builder()
        .method("GET")
        .uri(path)
        .header(HOST, authority)
        .header(USER_AGENT, USER_AGENT_VALUE)
        .body(Empty::<Bytes>::new())?;

    let resp = sender.send_request(req).await.map_err(ProbeError::Request)?;
    if !resp.status().is_success() {
        debug!(status = %resp.status(), %uri, "probe non-2xx");
        return Err(ProbeError::Status(resp.status()));
    }
    Ok(resp)
}

/// Time one heartbeat request, including reading the body.
pub async fn probe(uri: &Uri, timeout: Duration) -> Result<ProbeSample, ProbeError> {
    let started = Instant::now();

    let result = tokio::time::timeout(timeout, async {
        let resp = send_get(uri).await?;
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(ProbeError::Body)?
            .to_bytes();
        Ok::<_, ProbeError>(body)
    })
    .await;

    let body = match result {
        Ok(body) => body?,
        Err(_) => {
            debug!(%uri, "probe timed out");
            return Err(ProbeError::Timeout(timeout));
        }
    };
    let rtt = started.elapsed();

    let server_time = match serde_json::from_slice::<Heartbeat>(&body) {
        Ok(heartbeat) => heartbeat.parsed().ok(),
        Err(e) => {
            debug!(error = %e, %uri, "heartbeat body is not a timestamp");
            None
        }
    };

    Ok(ProbeSample { rtt, server_time })
}
