//! Data Transfer Objects
//!
//! Request and response types for the API endpoints. Write accounting and
//! range results serialize from their home modules (`ingest::WriteOutcome`,
//! `query::RangeResult`); what lives here is the inbound parameter shapes
//! and the health payload.

use serde::{Deserialize, Serialize};

/// Query parameters accepted by `GET /tsdb/:key`.
///
/// Everything is optional and arrives as text; parse failures become 400
/// envelopes rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    /// Range start, epoch seconds (default 0)
    #[serde(default)]
    pub start: Option<String>,
    /// Range end, epoch seconds (default: now)
    #[serde(default)]
    pub end: Option<String>,
    /// `timestamp` (default) or `datetime`
    #[serde(default)]
    pub tstype: Option<String>,
    /// Bucket aggregation function (default `avg`)
    #[serde(default)]
    pub aggr_func: Option<String>,
    /// Bucket width in seconds (default 86400)
    #[serde(default)]
    pub aggr_secs: Option<String>,
}

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or degraded
    pub status: String,
    /// Store reachability
    pub store: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
