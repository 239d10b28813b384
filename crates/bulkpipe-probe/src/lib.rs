//! bulkpipe-probe — client side of bulkpipe.
//!
//! Measures heartbeat round-trip latency against a bulkpipe server and
//! verifies that a full download arrives with the declared length.
//!
//! # Architecture
//!
//! ```text
//! LatencyProbe
//!   ├── probe(uri, timeout) → ProbeSample | ProbeError
//!   ├── ProbeStats (samples, failures, min/mean/max)
//!   └── sleep(interval) or shutdown
//!
//! verify_download(uri, timeout) → DownloadReport | ProbeError
//! ```
//!
//! A failed probe is logged and counted; the loop carries on at the next
//! interval. Nothing is retried early.

pub mod checker;
pub mod download;
pub mod error;
pub mod monitor;

pub use checker::{download_uri, heartbeat_uri, probe, ProbeSample};
pub use download::{verify_download, DownloadReport};
pub use error::ProbeError;
pub use monitor::{LatencyProbe, ProbeStats};
