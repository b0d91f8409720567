//! Data Transfer Objects
//!
//! Request parameters and response types for the API endpoints. The wire
//! format uses camelCase keys; day-detail responses reuse
//! [`crate::battery::Sample`] directly since its serde shape already matches
//! the front-end.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /dates`.
///
/// Kept as raw strings so malformed values can be rejected with the API's
/// own JSON error body instead of the extractor's default rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DatesParams {
    /// Zero-indexed page, default 0
    #[serde(default)]
    pub page: Option<String>,
    /// Days per page, default 5
    #[serde(default)]
    pub size: Option<String>,
}

/// Response for `GET /dates`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesResponse {
    /// Total pages at the requested size
    pub total_pages: usize,
    /// Total distinct days with samples
    pub total_items: usize,
    /// Days on this page as `YYYY-MM-DD`, most recent first
    pub dates: Vec<NaiveDate>,
}

/// Query parameters for `GET /data`.
#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
    /// Day to fetch as `YYYY-MM-DD`, default today (host-local)
    #[serde(default)]
    pub date: Option<String>,
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the server can answer at all
    pub status: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
