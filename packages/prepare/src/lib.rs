#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Offline preparation of the weekly surveillance CSV.
//!
//! The raw export carries its date as separate `day`, `mon` and `year`
//! columns plus a spreadsheet index column. Druid wants a single
//! `__time` column, so [`transform`] rewrites the file into that shape
//! before ingestion. [`summary`] prints a quick profile of a CSV so the
//! result can be sanity-checked by eye.

pub mod summary;
pub mod transform;

pub use summary::{ColumnSummary, DatasetSummary, summarize, summarize_file};
pub use transform::{PrepareStats, prepare, prepare_file};

/// Errors that can occur while preparing or profiling a dataset.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The input lacks a column the transformation needs.
    #[error("Input is missing required column '{column}'")]
    MissingColumn {
        /// Header name that was not found.
        column: String,
    },

    /// A record's day, month and year do not form a calendar date.
    #[error("Record {record} has an invalid date (year={year:?}, mon={month:?}, day={day:?})")]
    InvalidDate {
        /// 1-based data record number (the header is not counted).
        record: u64,
        /// Raw `year` cell.
        year: String,
        /// Raw `mon` cell.
        month: String,
        /// Raw `day` cell.
        day: String,
    },
}
