//! `bulkpipe download` — fetch the full payload and check its length.

use anyhow::{Context, Result};
use bulkpipe_core::BulkpipeConfig;
use bulkpipe_probe::{download_uri, verify_download};

use super::duration_flag;

pub async fn download(config: &BulkpipeConfig, url: Option<String>, timeout: Option<&str>) -> Result<()> {
    let url = url.unwrap_or_else(|| config.probe_url());
    let timeout = duration_flag(timeout, config.probe_timeout()?)?;
    let uri = download_uri(&url)?;

    let report = verify_download(&uri, timeout)
        .await
        .with_context(|| format!("download from {uri} failed"))?;

    println!(
        "received {} bytes in {:.1}s ({:.1} MiB/s, {} frames)",
        report.received,
        report.elapsed.as_secs_f64(),
        report.throughput_mib_s(),
        report.frames
    );
    Ok(())
}
