//! Druid SQL-over-HTTP client.
//!
//! Statements are posted to `/druid/v2/sql` with their dynamic parameters
//! in the request body, and the default `object` result format is decoded
//! into [`RawRow`]s. Druid reports query errors as JSON bodies carrying
//! `error`, `errorMessage` and `errorClass`; the `errorMessage` is
//! surfaced to callers when present.
//!
//! See <https://druid.apache.org/docs/latest/api-reference/sql-api>

use std::time::Duration;

use async_trait::async_trait;
use epi_dash_store_models::{RawRow, SqlStatement};

use crate::{Store, StoreConfig, StoreError};

/// Maximum length of a raw response body included in error messages.
const BODY_PREVIEW_LEN: usize = 500;

/// [`Store`] backed by a Druid broker.
#[derive(Debug, Clone)]
pub struct DruidClient {
    client: reqwest::Client,
    endpoint: String,
    datasource: String,
    timeout: Duration,
}

impl DruidClient {
    /// Builds a client for the broker described by `config`.
    ///
    /// The underlying `reqwest::Client` is created once and reused, so
    /// connections are pooled across requests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the HTTP client cannot be
    /// constructed (e.g. the TLS backend fails to initialise).
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.sql_endpoint(),
            datasource: config.datasource.clone(),
            timeout: config.timeout,
        })
    }

    /// Full URL of the SQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: &reqwest::Error) -> StoreError {
        let message = if err.is_timeout() {
            format!(
                "request to {} timed out after {}s",
                self.endpoint,
                self.timeout.as_secs()
            )
        } else if err.is_connect() {
            format!("could not connect to {}: {err}", self.endpoint)
        } else {
            format!("request to {} failed: {err}", self.endpoint)
        };
        StoreError::Unavailable { message }
    }
}

#[async_trait]
impl Store for DruidClient {
    fn datasource(&self) -> &str {
        &self.datasource
    }

    async fn execute(&self, statement: &SqlStatement) -> Result<Vec<RawRow>, StoreError> {
        log::debug!(
            "Executing SQL with {} parameter(s): {}",
            statement.parameters.len(),
            statement.query
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .json(statement)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        let rows = decode_rows(&body)?;
        log::debug!("Store returned {} row(s)", rows.len());
        Ok(rows)
    }
}

/// Classifies a non-success HTTP status from the broker.
///
/// 4xx means Druid understood the request and refused the statement;
/// anything else is treated as the store being unavailable.
fn status_error(status: u16, body: &str) -> StoreError {
    let message = upstream_message(body);
    if (400..500).contains(&status) {
        StoreError::Rejected { status, message }
    } else {
        StoreError::Unavailable {
            message: format!("HTTP {status}: {message}"),
        }
    }
}

/// Extracts the most useful error text from a Druid error body.
fn upstream_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(obj)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["errorMessage", "error"] {
            if let Some(msg) = obj.get(key).and_then(serde_json::Value::as_str)
                && !msg.is_empty()
            {
                return msg.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    trimmed.chars().take(BODY_PREVIEW_LEN).collect()
}

/// Decodes an `object`-format result body into rows.
///
/// # Errors
///
/// Returns [`StoreError::InvalidResponse`] if the body is not a JSON
/// array or any element is not an object.
pub fn decode_rows(body: &str) -> Result<Vec<RawRow>, StoreError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| StoreError::InvalidResponse {
            message: format!("body is not valid JSON: {e}"),
        })?;

    let serde_json::Value::Array(items) = value else {
        return Err(StoreError::InvalidResponse {
            message: "expected a JSON array of rows".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            serde_json::Value::Object(obj) => Ok(RawRow::from(obj)),
            other => Err(StoreError::InvalidResponse {
                message: format!("row {i} is not an object: {other}"),
            }),
        })
        .collect()
}
