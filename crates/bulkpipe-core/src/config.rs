//! bulkpipe.toml configuration parser.
//!
//! Every field is optional; binaries fill gaps with their defaults and let
//! command-line flags override whatever the file says.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [probe]
//! url = "http://localhost:8080"
//! interval = "5s"
//! timeout = "10s"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PROBE_URL: &str = "http://localhost:8080";
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BulkpipeConfig {
    pub server: Option<ServerSection>,
    pub probe: Option<ProbeSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProbeSection {
    pub url: Option<String>,
    /// Pause between probes, e.g. "5s".
    pub interval: Option<String>,
    /// Per-request deadline, e.g. "500ms".
    pub timeout: Option<String>,
}

impl BulkpipeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BulkpipeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if given, otherwise an empty config.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn server_host(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.server.as_ref().and_then(|s| s.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn probe_url(&self) -> String {
        self.probe
            .as_ref()
            .and_then(|p| p.url.clone())
            .unwrap_or_else(|| DEFAULT_PROBE_URL.to_string())
    }

    pub fn probe_interval(&self) -> anyhow::Result<Duration> {
        section_duration(
            self.probe.as_ref().and_then(|p| p.interval.as_deref()),
            DEFAULT_PROBE_INTERVAL,
        )
    }

    pub fn probe_timeout(&self) -> anyhow::Result<Duration> {
        section_duration(
            self.probe.as_ref().and_then(|p| p.timeout.as_deref()),
            DEFAULT_PROBE_TIMEOUT,
        )
    }
}

fn section_duration(value: Option<&str>, default: Duration) -> anyhow::Result<Duration> {
    match value {
        Some(s) => parse_duration(s).ok_or_else(|| anyhow::anyhow!("invalid duration: {s:?}")),
        None => Ok(default),
    }
}

/// Parse a duration string like "5s", "500ms", "1m". A bare number is
/// taken as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
