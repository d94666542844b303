#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query construction and result mapping for the epidemiological views.
//!
//! Each view goes through the same pipeline: [`queries`] turns validated
//! parameters into a parameterized [`SqlStatement`], the [`Store`]
//! executes it, and [`mapping`] narrows the untyped rows into the records
//! of `epi_dash_analytics_models`. [`views`] wires the three together.
//!
//! [`SqlStatement`]: epi_dash_store_models::SqlStatement
//! [`Store`]: epi_dash_store::Store

pub mod mapping;
pub mod queries;
pub mod validate;
pub mod views;

use thiserror::Error;

pub use mapping::MalformedRow;

/// Errors that can occur while serving an analytical view.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A required request parameter was missing. No query was issued.
    #[error("{message}")]
    BadRequest {
        /// Description of what was wrong with the request.
        message: String,
    },

    /// Executing a statement against the store failed.
    #[error(transparent)]
    Store(#[from] epi_dash_store::StoreError),

    /// A single-row aggregate could not be narrowed to its record type.
    #[error(transparent)]
    MalformedRow(#[from] MalformedRow),
}
