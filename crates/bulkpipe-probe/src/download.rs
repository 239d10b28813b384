//! Full-download check: fetch the payload and compare what arrived with
//! the declared `content-length`.

use std::time::{Duration, Instant};

use http::header::CONTENT_LENGTH;
use http::Uri;
use http_body_util::BodyExt;
use tracing::{debug, info};

use crate::checker::send_get;
use crate::error::ProbeError;

/// Log progress every this many bytes.
const PROGRESS_STEP: u64 = 1024 * 1024 * 1024;

/// What a completed download looked like from the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadReport {
    /// `content-length` sent by the server, if any.
    pub declared: Option<u64>,
    pub received: u64,
    /// Body frames read; depends on socket reads, not on server chunks.
    pub frames: u64,
    pub elapsed: Duration,
}

impl DownloadReport {
    pub fn throughput_mib_s(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.received as f64 / (1024.0 * 1024.0) / secs
    }
}

/// Download `uri` to nowhere, counting bytes.
///
/// `timeout` bounds connecting and receiving the response headers; the
/// body itself may take as long as it takes. A short body is an error,
/// either from hyper (connection closed early) or as
/// [`ProbeError::LengthMismatch`].
pub async fn verify_download(uri: &Uri, timeout: Duration) -> Result<DownloadReport, ProbeError> {
    let started = Instant::now();

    let resp = match tokio::time::timeout(timeout, send_get(uri)).await {
        Ok(resp) => resp?,
        Err(_) => return Err(ProbeError::Timeout(timeout)),
    };

    let declared = resp
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    info!(%uri, ?declared, "download started");

    let mut body = resp.into_body();
    let mut received = 0u64;
    let mut frames = 0u64;
    let mut next_progress = PROGRESS_STEP;

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(ProbeError::Body)?;
        if let Some(data) = frame.data_ref() {
            received += data.len() as u64;
            frames += 1;
            if received >= next_progress {
                debug!(received, ?declared, "download progress");
                next_progress += PROGRESS_STEP;
            }
        }
    }

    let report = DownloadReport {
        declared,
        received,
        frames,
        elapsed: started.elapsed(),
    };

    if let Some(declared) = declared {
        if declared != received {
            return Err(ProbeError::LengthMismatch { declared, received });
        }
    }

    info!(
        received,
        frames,
        elapsed_ms = report.elapsed.as_millis() as u64,
        mib_per_sec = report.throughput_mib_s(),
        "download verified"
    );
    Ok(report)
}
