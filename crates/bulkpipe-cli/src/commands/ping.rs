//! `bulkpipe ping` — periodic heartbeat latency measurement.

use std::time::Duration;

use anyhow::Result;
use bulkpipe_core::BulkpipeConfig;
use bulkpipe_probe::{heartbeat_uri, LatencyProbe};
use tokio::sync::watch;
use tracing::{info, warn};

use super::duration_flag;

/// Probe settings after merging flags over the config file.
#[derive(Debug, PartialEq)]
pub struct PingSettings {
    pub url: String,
    pub interval: Duration,
    pub timeout: Duration,
    pub count: Option<u64>,
}

impl PingSettings {
    pub fn resolve(
        config: &BulkpipeConfig,
        url: Option<String>,
        interval_secs: Option<u64>,
        timeout: Option<&str>,
        count: Option<u64>,
    ) -> Result<Self> {
        let interval = match interval_secs {
            Some(secs) => Duration::from_secs(secs),
            None => config.probe_interval()?,
        };
        Ok(Self {
            url: url.unwrap_or_else(|| config.probe_url()),
            interval,
            timeout: duration_flag(timeout, config.probe_timeout()?)?,
            count,
        })
    }
}

pub async fn ping(settings: PingSettings) -> Result<()> {
    let uri = heartbeat_uri(&settings.url)?;
    let mut probe = LatencyProbe::new(uri, settings.interval, settings.timeout);
    if let Some(count) = settings.count {
        probe = probe.with_max_probes(count);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupted"),
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
        let _ = shutdown_tx.send(true);
    });

    info!(uri = %probe.uri(), interval_secs = settings.interval.as_secs(), "pinging");
    let stats = probe.run(shutdown_rx).await;
    println!("{stats}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkpipe_core::ProbeSection;

    #[test]
    fn defaults_without_flags_or_file() {
        let settings =
            PingSettings::resolve(&BulkpipeConfig::default(), None, None, None, None).unwrap();
        assert_eq!(
            settings,
            PingSettings {
                url: "http://localhost:8080".to_string(),
                interval: Duration::from_secs(5),
                timeout: Duration::from_secs(10),
                count: None,
            }
        );
    }

    #[test]
    fn flags_override_file() {
        let config = BulkpipeConfig {
            probe: Some(ProbeSection {
                url: Some("http://file:1".to_string()),
                interval: Some("30s".to_string()),
                timeout: Some("1s".to_string()),
            }),
            ..BulkpipeConfig::default()
        };

        let settings = PingSettings::resolve(
            &config,
            Some("http://flag:2".to_string()),
            Some(2),
            Some("250ms"),
            Some(4),
        )
        .unwrap();

        assert_eq!(settings.url, "http://flag:2");
        assert_eq!(settings.interval, Duration::from_secs(2));
        assert_eq!(settings.timeout, Duration::from_millis(250));
        assert_eq!(settings.count, Some(4));
    }

    #[test]
    fn file_values_used_when_flags_absent() {
        let config = BulkpipeConfig {
            probe: Some(ProbeSection {
                url: None,
                interval: Some("1m".to_string()),
                timeout: None,
            }),
            ..BulkpipeConfig::default()
        };

        let settings = PingSettings::resolve(&config, None, None, None, None).unwrap();
        assert_eq!(settings.interval, Duration::from_secs(60));
    }

    #[test]
    fn bad_timeout_flag_is_an_error() {
        let result =
            PingSettings::resolve(&BulkpipeConfig::default(), None, None, Some("later"), None);
        assert!(result.is_err());
    }
}
