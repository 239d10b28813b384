//! Heartbeat payload served by `GET /ping`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// `{"timestamp": "<RFC 3339>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub timestamp: String,
}

impl Heartbeat {
    /// Heartbeat for a given instant, in UTC with second precision.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Parse the timestamp back into an instant.
    pub fn parsed(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.timestamp).map(|t| t.with_timezone(&Utc))
    }
}
