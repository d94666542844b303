#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP-facing types for the analytics API server.
//!
//! Query-string structs keep every field optional so that a missing
//! parameter reaches the handler and is reported with the API's own
//! error body, instead of being rejected by the extractor. The success
//! envelopes live in `epi_dash_analytics_models`.

use serde::{Deserialize, Serialize};

/// Query parameters for `GET /trend`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendQuery {
    /// State/UT name (required).
    pub state_ut: Option<String>,
    /// Disease name (required).
    pub disease: Option<String>,
}

/// Query parameters for `GET /top-diseases`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopDiseasesQuery {
    /// State/UT name (required).
    pub state_ut: Option<String>,
    /// Week in `YYYY-MM-DD` format (optional, informational).
    pub week: Option<String>,
}

/// Query parameters for `GET /climate-impact`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClimateImpactQuery {
    /// Disease name (required).
    pub disease: Option<String>,
}

/// Query parameters for `GET /map`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapQuery {
    /// Week start in `YYYY-MM-DD` format (required).
    pub week: Option<String>,
    /// Disease name (required).
    pub disease: Option<String>,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Human-readable status line.
    pub message: String,
    /// Server crate version.
    pub version: String,
}

/// Error body for every non-2xx response.
///
/// The field is named `detail` because that is what the dashboard's
/// API client reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error message.
    pub detail: String,
}

impl ApiError {
    /// Creates an error body from anything displayable.
    #[must_use]
    pub fn new(detail: impl std::fmt::Display) -> Self {
        Self {
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_uses_detail_field() {
        assert_eq!(
            serde_json::to_value(ApiError::new("Missing required query parameter 'disease'"))
                .unwrap(),
            serde_json::json!({"detail": "Missing required query parameter 'disease'"})
        );
    }
}
