pub mod download;
pub mod ping;

use std::time::Duration;

use anyhow::Result;
use bulkpipe_core::config::parse_duration;

/// Resolve a duration flag, falling back to `default` when absent.
pub(crate) fn duration_flag(flag: Option<&str>, default: Duration) -> Result<Duration> {
    match flag {
        Some(s) => parse_duration(s).ok_or_else(|| anyhow::anyhow!("invalid duration: {s:?}")),
        None => Ok(default),
    }
}
