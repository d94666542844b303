//! Raw export to Druid-ready CSV.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;

use crate::PrepareError;

/// Timestamp column Druid ingests as the primary time dimension.
pub const TIME_COLUMN: &str = "__time";

/// Index column left behind by the spreadsheet export.
pub const INDEX_COLUMN: &str = "Unnamed: 0";

const DEATHS_COLUMN: &str = "Deaths";
const DAY_COLUMN: &str = "day";
const MONTH_COLUMN: &str = "mon";
const YEAR_COLUMN: &str = "year";

/// Outcome of a successful [`prepare`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareStats {
    /// Data records written.
    pub records: u64,
    /// `Deaths` cells that were not numeric and were blanked.
    pub blanked_deaths: u64,
}

/// Column positions the transformation reads.
struct Layout {
    deaths: usize,
    day: usize,
    month: usize,
    year: usize,
    /// Source columns copied through, in input order.
    kept: Vec<usize>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, PrepareError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| PrepareError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let deaths = find(DEATHS_COLUMN)?;
        let day = find(DAY_COLUMN)?;
        let month = find(MONTH_COLUMN)?;
        let year = find(YEAR_COLUMN)?;

        let kept = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| {
                *i != day && *i != month && *i != year && h.trim() != INDEX_COLUMN
            })
            .map(|(i, _)| i)
            .collect();

        Ok(Self {
            deaths,
            day,
            month,
            year,
            kept,
        })
    }
}

/// Rewrites the raw export read from `input` into Druid-ready CSV on
/// `output`.
///
/// * `Deaths` is kept only when it is a finite number; anything else
///   becomes an empty cell.
/// * `day`, `mon` and `year` are combined into a `YYYY-MM-DD` [`TIME_COLUMN`]
///   appended after all other columns, then dropped together with
///   [`INDEX_COLUMN`].
///
/// # Errors
///
/// * [`PrepareError::MissingColumn`] if `Deaths`, `day`, `mon` or `year`
///   is absent
/// * [`PrepareError::InvalidDate`] on the first record whose date parts
///   are not a real calendar date; nothing after it is written
/// * [`PrepareError::Csv`] if reading or writing fails
pub fn prepare<R: Read, W: Write>(input: R, output: W) -> Result<PrepareStats, PrepareError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(input);
    let mut writer = csv::Writer::from_writer(output);

    let headers = reader.headers()?.clone();
    let layout = Layout::from_headers(&headers)?;

    let mut out_headers: Vec<&str> = layout.kept.iter().map(|&i| &headers[i]).collect();
    out_headers.push(TIME_COLUMN);
    writer.write_record(&out_headers)?;

    let mut stats = PrepareStats {
        records: 0,
        blanked_deaths: 0,
    };
    let mut row: Vec<String> = Vec::with_capacity(out_headers.len());

    for result in reader.records() {
        let record = result?;
        stats.records += 1;

        let time = record_date(&record, &layout)
            .ok_or_else(|| PrepareError::InvalidDate {
                record: stats.records,
                year: cell(&record, layout.year).to_string(),
                month: cell(&record, layout.month).to_string(),
                day: cell(&record, layout.day).to_string(),
            })?
            .format("%Y-%m-%d")
            .to_string();

        row.clear();
        for &i in &layout.kept {
            if i == layout.deaths {
                let deaths = numeric_or_blank(cell(&record, i));
                if deaths.is_empty() && !cell(&record, i).trim().is_empty() {
                    stats.blanked_deaths += 1;
                }
                row.push(deaths);
            } else {
                row.push(cell(&record, i).to_string());
            }
        }
        row.push(time);
        writer.write_record(&row)?;
    }

    writer.flush()?;

    log::info!(
        "Prepared {} records ({} non-numeric Deaths values blanked)",
        stats.records,
        stats.blanked_deaths
    );

    Ok(stats)
}

/// [`prepare`] between two files. The output is created or truncated.
///
/// # Errors
///
/// Returns [`PrepareError`] if either file cannot be opened or
/// [`prepare`] fails.
pub fn prepare_file(input: &Path, output: &Path) -> Result<PrepareStats, PrepareError> {
    log::info!("Preparing {} -> {}", input.display(), output.display());
    let input = File::open(input)?;
    let output = File::create(output)?;
    prepare(input, output)
}

fn cell(record: &csv::StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

fn record_date(record: &csv::StringRecord, layout: &Layout) -> Option<NaiveDate> {
    let year = i32::try_from(whole_number(cell(record, layout.year))?).ok()?;
    let month = u32::try_from(whole_number(cell(record, layout.month))?).ok()?;
    let day = u32::try_from(whole_number(cell(record, layout.day))?).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses an integer cell, also accepting float spellings like `"3.0"`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn whole_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15).then_some(f as i64)
}

fn numeric_or_blank(raw: &str) -> String {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => raw.to_string(),
        _ => String::new(),
    }
}
