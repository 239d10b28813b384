//! Periodic latency probe loop.

use std::fmt;
use std::time::Duration;

use http::Uri;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::checker::probe;

/// Running latency summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeStats {
    pub samples: u64,
    pub failures: u64,
    min: Option<Duration>,
    max: Option<Duration>,
    total: Duration,
}

impl ProbeStats {
    pub fn record_success(&mut self, rtt: Duration) {
        self.samples += 1;
        self.total += rtt;
        self.min = Some(self.min.map_or(rtt, |m| m.min(rtt)));
        self.max = Some(self.max.map_or(rtt, |m| m.max(rtt)));
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Successful plus failed probes.
    pub fn attempts(&self) -> u64 {
        self.samples + self.failures
    }

    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.samples == 0 {
            return None;
        }
        Some(self.total / self.samples as u32)
    }
}

impl fmt::Display for ProbeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ok, {} failed", self.samples, self.failures)?;
        if let (Some(min), Some(mean), Some(max)) = (self.min, self.mean(), self.max) {
            write!(f, ", rtt min/mean/max = {min:?}/{mean:?}/{max:?}")?;
        }
        Ok(())
    }
}

/// Probes one heartbeat endpoint at a fixed interval.
#[derive(Debug, Clone)]
pub struct LatencyProbe {
    uri: Uri,
    interval: Duration,
    timeout: Duration,
    max_probes: Option<u64>,
}

impl LatencyProbe {
    pub fn new(uri: Uri, interval: Duration, timeout: Duration) -> Self {
        Self {
            uri,
            interval,
            timeout,
            max_probes: None,
        }
    }

    /// Stop after `count` attempts instead of running until shutdown.
    pub fn with_max_probes(mut self, count: u64) -> Self {
        self.max_probes = Some(count);
        self
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Probe until shutdown or the attempt limit, returning the summary.
    ///
    /// The first probe goes out immediately. Every attempt, successful or
    /// not, is followed by the full interval before the next one.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ProbeStats {
        let mut stats = ProbeStats::default();

        debug!(uri = %self.uri, interval = ?self.interval, "latency probe starting");

        loop {
            if self.limit_reached(&stats) {
                break;
            }

            match probe(&self.uri, self.timeout).await {
                Ok(sample) => {
                    stats.record_success(sample.rtt);
                    info!(
                        rtt_ms = sample.rtt.as_secs_f64() * 1000.0,
                        server_time = ?sample.server_time,
                        "ping"
                    );
                }
                Err(e) => {
                    stats.record_failure();
                    warn!(error = %e, uri = %self.uri, "ping failed");
                }
            }

            if self.limit_reached(&stats) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    debug!("latency probe shutting down");
                    break;
                }
            }
        }

        info!(%stats, "latency probe finished");
        stats
    }

    fn limit_reached(&self, stats: &ProbeStats) -> bool {
        self.max_probes.is_some_and(|max| stats.attempts() >= max)
    }
}
