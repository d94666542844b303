#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the analytical store.
//!
//! The store is an Apache Druid broker reached over its SQL-over-HTTP
//! API. Callers depend on the [`Store`] trait; [`DruidClient`] is the
//! production implementation. The client never retries: a failed call is
//! reported once and the caller decides what to do with it.

pub mod config;
pub mod druid;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;

pub use config::StoreConfig;
pub use druid::DruidClient;

use async_trait::async_trait;
use epi_dash_store_models::{RawRow, SqlStatement};
use thiserror::Error;

/// Errors from executing a statement against the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached, timed out, or failed with a
    /// server-side error.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Upstream or transport error message.
        message: String,
    },

    /// The store refused the statement (HTTP 4xx). Since all SQL is
    /// generated internally this points at a query builder defect.
    #[error("Query rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status returned by the store.
        status: u16,
        /// Upstream error message.
        message: String,
    },

    /// The store answered successfully but the body was not an array of
    /// row objects.
    #[error("Invalid store response: {message}")]
    InvalidResponse {
        /// Description of what was wrong with the body.
        message: String,
    },
}

/// A SQL-over-HTTP analytical store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Name of the datasource (table) that statements should select from.
    fn datasource(&self) -> &str;

    /// Executes `statement` and returns the result rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable, rejects the
    /// statement, or returns a body that cannot be decoded into rows.
    async fn execute(&self, statement: &SqlStatement) -> Result<Vec<RawRow>, StoreError>;
}
