//! Request parameter normalization.
//!
//! Filter values are trimmed and otherwise passed through untouched: no
//! case folding, and a value that is empty after trimming is still a
//! value. Only a parameter that is absent altogether is an error.

use crate::AnalyticsError;

/// Returns the trimmed value of a required parameter.
///
/// # Errors
///
/// Returns [`AnalyticsError::BadRequest`] if the parameter is absent.
pub fn required(value: Option<&str>, name: &str) -> Result<String, AnalyticsError> {
    value
        .map(|v| v.trim().to_string())
        .ok_or_else(|| AnalyticsError::BadRequest {
            message: format!("Missing required query parameter '{name}'"),
        })
}

/// Returns the trimmed value of an optional parameter.
#[must_use]
pub fn optional(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
