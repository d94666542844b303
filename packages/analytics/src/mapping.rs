//! Narrowing of raw store rows into typed records.
//!
//! Numeric fields follow the coalesce-to-zero convention: `null`, `false`
//! and the empty string become `0` / `0.0`. This conflates "no data" with
//! a real zero, which the dashboard relies on. Anything that is present
//! but cannot be read as the expected type is a [`MalformedRow`]; in a
//! batch only that record is dropped, the rest are still returned.
//!
//! Temperatures are stored in Kelvin and converted to Celsius here, once.

use epi_dash_analytics_models::{
    ClimateDataPoint, ClimateMetrics, DiseaseRanking, GeoPoint, TOP_DISEASES_LIMIT,
    TimeSeriesPoint,
};
use epi_dash_store_models::{RawRow, ScalarValue};
use thiserror::Error;

use crate::queries::{
    AVG_LAI, AVG_PRECIPITATION, AVG_TEMP, DISEASE, DISTRICT, LATITUDE, LONGITUDE, MAX_DATE,
    MIN_DATE, STATE_UT, TOTAL_CASES, WEEK,
};

/// Offset between Kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// A row field that could not be narrowed to its expected type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed row: column '{column}' {reason}")]
pub struct MalformedRow {
    /// Offending column.
    pub column: String,
    /// What was wrong with it.
    pub reason: String,
}

impl MalformedRow {
    fn new(column: &str, reason: impl Into<String>) -> Self {
        Self {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

/// Records mapped from a batch of rows, plus the rows that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRows<T> {
    /// Successfully mapped records, in row order unless stated otherwise.
    pub records: Vec<T>,
    /// One entry per dropped row.
    pub malformed: Vec<MalformedRow>,
}

impl<T> MappedRows<T> {
    /// Logs every dropped row against `view` and returns the records.
    #[must_use]
    pub fn into_records(self, view: &str) -> Vec<T> {
        for err in &self.malformed {
            log::warn!("{view}: dropping row: {err}");
        }
        self.records
    }

    /// Like [`into_records`](Self::into_records), but a batch in which
    /// every row was dropped fails with the first [`MalformedRow`].
    ///
    /// # Errors
    ///
    /// Returns the first [`MalformedRow`] if no row could be mapped.
    pub fn into_nonempty_records(self, view: &str) -> Result<Vec<T>, MalformedRow> {
        if self.records.is_empty()
            && let Some(first) = self.malformed.first().cloned()
        {
            log::error!("{view}: every row is malformed ({} rows)", self.malformed.len());
            return Err(first);
        }
        Ok(self.into_records(view))
    }
}

/// Maps each row with `f`, keeping the rows that fail aside.
pub fn map_rows<T>(
    rows: &[RawRow],
    f: impl Fn(&RawRow) -> Result<T, MalformedRow>,
) -> MappedRows<T> {
    let mut records = Vec::with_capacity(rows.len());
    let mut malformed = Vec::new();
    for row in rows {
        match f(row) {
            Ok(record) => records.push(record),
            Err(e) => malformed.push(e),
        }
    }
    MappedRows { records, malformed }
}

fn field<'a>(row: &'a RawRow, column: &str) -> Result<&'a ScalarValue, MalformedRow> {
    row.get(column)
        .ok_or_else(|| MalformedRow::new(column, "is missing"))
}

/// Truncates a finite, non-negative float to a count.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_count(column: &str, value: f64) -> Result<u64, MalformedRow> {
    if !value.is_finite() {
        return Err(MalformedRow::new(column, format!("is not finite ({value})")));
    }
    let truncated = value.trunc();
    if truncated < 0.0 {
        return Err(MalformedRow::new(column, format!("is negative ({value})")));
    }
    Ok(truncated as u64)
}

/// Reads a non-negative integer count, truncating fractional values.
///
/// # Errors
///
/// Returns [`MalformedRow`] if the column is missing, negative, or not
/// numeric.
pub fn count(row: &RawRow, column: &str) -> Result<u64, MalformedRow> {
    match field(row, column)? {
        ScalarValue::Null | ScalarValue::Bool(false) => Ok(0),
        ScalarValue::Bool(true) => Ok(1),
        ScalarValue::Integer(i) => u64::try_from(*i)
            .map_err(|_| MalformedRow::new(column, format!("is negative ({i})"))),
        ScalarValue::Float(x) => truncate_count(column, *x),
        ScalarValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            if let Ok(i) = s.parse::<i64>() {
                return u64::try_from(i)
                    .map_err(|_| MalformedRow::new(column, format!("is negative ({i})")));
            }
            s.parse::<f64>()
                .map_err(|_| MalformedRow::new(column, format!("is not numeric ({s:?})")))
                .and_then(|x| truncate_count(column, x))
        }
    }
}

/// Reads a float, coalescing `null` to `0.0`.
///
/// # Errors
///
/// Returns [`MalformedRow`] if the column is missing, not numeric, or not
/// finite.
#[allow(clippy::cast_precision_loss)]
pub fn float(row: &RawRow, column: &str) -> Result<f64, MalformedRow> {
    let value = match field(row, column)? {
        ScalarValue::Null | ScalarValue::Bool(false) => return Ok(0.0),
        ScalarValue::Bool(true) => 1.0,
        ScalarValue::Integer(i) => *i as f64,
        ScalarValue::Float(x) => *x,
        ScalarValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0.0);
            }
            s.parse::<f64>()
                .map_err(|_| MalformedRow::new(column, format!("is not numeric ({s:?})")))?
        }
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MalformedRow::new(column, format!("is not finite ({value})")))
    }
}

/// Converts a Kelvin reading to degrees Celsius.
#[must_use]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Reads a Kelvin temperature and returns it in Celsius.
///
/// A missing reading (null or zero) is reported as `0.0`, not as
/// absolute zero.
///
/// # Errors
///
/// Returns [`MalformedRow`] under the same conditions as [`float`].
#[allow(clippy::float_cmp)]
pub fn celsius(row: &RawRow, column: &str) -> Result<f64, MalformedRow> {
    let kelvin = float(row, column)?;
    if kelvin == 0.0 {
        return Ok(0.0);
    }
    Ok(kelvin_to_celsius(kelvin))
}

/// Reads a text label. Numbers are rendered; nulls are rejected.
///
/// # Errors
///
/// Returns [`MalformedRow`] if the column is missing, null, or boolean.
pub fn label(row: &RawRow, column: &str) -> Result<String, MalformedRow> {
    match field(row, column)? {
        ScalarValue::String(s) => Ok(s.clone()),
        v @ (ScalarValue::Integer(_) | ScalarValue::Float(_)) => Ok(v.to_string()),
        v @ (ScalarValue::Null | ScalarValue::Bool(_)) => {
            Err(MalformedRow::new(column, format!("is {}, expected text", v.kind())))
        }
    }
}

/// Maps a trend row.
///
/// # Errors
///
/// Returns [`MalformedRow`] if any field cannot be narrowed.
pub fn time_series_point(row: &RawRow) -> Result<TimeSeriesPoint, MalformedRow> {
    Ok(TimeSeriesPoint {
        week: label(row, WEEK)?,
        cases: count(row, TOTAL_CASES)?,
    })
}

/// Maps a ranking row.
///
/// # Errors
///
/// Returns [`MalformedRow`] if any field cannot be narrowed.
pub fn disease_ranking(row: &RawRow) -> Result<DiseaseRanking, MalformedRow> {
    Ok(DiseaseRanking {
        disease: label(row, DISEASE)?,
        total_cases: count(row, TOTAL_CASES)?,
    })
}

/// Maps the single-row climate aggregate.
///
/// # Errors
///
/// Returns [`MalformedRow`] if any field cannot be narrowed.
pub fn climate_metrics(row: &RawRow) -> Result<ClimateMetrics, MalformedRow> {
    Ok(ClimateMetrics {
        avg_temp: celsius(row, AVG_TEMP)?,
        avg_precipitation: float(row, AVG_PRECIPITATION)?,
        avg_lai: float(row, AVG_LAI)?,
    })
}

/// Maps a climate time series row.
///
/// # Errors
///
/// Returns [`MalformedRow`] if any field cannot be narrowed.
pub fn climate_data_point(row: &RawRow) -> Result<ClimateDataPoint, MalformedRow> {
    Ok(ClimateDataPoint {
        week: label(row, WEEK)?,
        cases: count(row, TOTAL_CASES)?,
        temp: celsius(row, AVG_TEMP)?,
        precipitation: float(row, AVG_PRECIPITATION)?,
        lai: float(row, AVG_LAI)?,
    })
}

/// Maps a map row.
///
/// # Errors
///
/// Returns [`MalformedRow`] if any field cannot be narrowed.
pub fn geo_point(row: &RawRow) -> Result<GeoPoint, MalformedRow> {
    Ok(GeoPoint {
        district: label(row, DISTRICT)?,
        state_ut: label(row, STATE_UT)?,
        latitude: float(row, LATITUDE)?,
        longitude: float(row, LONGITUDE)?,
        total_cases: count(row, TOTAL_CASES)?,
    })
}

/// Weekly trend, ascending by week.
///
/// The store already orders by week; the stable sort only guards the
/// invariant and never reorders equal labels.
#[must_use]
pub fn trend_series(rows: &[RawRow]) -> MappedRows<TimeSeriesPoint> {
    let mut mapped = map_rows(rows, time_series_point);
    mapped.records.sort_by(|a, b| a.week.cmp(&b.week));
    mapped
}

/// Disease ranking: positive totals only, descending, at most
/// [`TOP_DISEASES_LIMIT`] entries. Ties keep the store's order.
#[must_use]
pub fn disease_rankings(rows: &[RawRow]) -> MappedRows<DiseaseRanking> {
    let mut mapped = map_rows(rows, disease_ranking);
    mapped.records.retain(|r| r.total_cases > 0);
    mapped
        .records
        .sort_by(|a, b| b.total_cases.cmp(&a.total_cases));
    mapped.records.truncate(TOP_DISEASES_LIMIT);
    mapped
}

/// Climate time series, ascending by week.
#[must_use]
pub fn climate_series(rows: &[RawRow]) -> MappedRows<ClimateDataPoint> {
    let mut mapped = map_rows(rows, climate_data_point);
    mapped.records.sort_by(|a, b| a.week.cmp(&b.week));
    mapped
}

/// Map districts in store order (descending by total).
#[must_use]
pub fn geo_points(rows: &[RawRow]) -> MappedRows<GeoPoint> {
    map_rows(rows, geo_point)
}

/// Reads an optional text value: null and the empty string are `None`.
///
/// # Errors
///
/// Returns [`MalformedRow`] if the column is missing or boolean.
pub fn optional_label(row: &RawRow, column: &str) -> Result<Option<String>, MalformedRow> {
    match field(row, column)? {
        ScalarValue::Null => Ok(None),
        ScalarValue::String(s) if s.is_empty() => Ok(None),
        _ => label(row, column).map(Some),
    }
}

/// Values of an enumerated column, in store order. Null and empty values
/// are skipped; rows without the column are malformed.
#[must_use]
pub fn dimension_values(rows: &[RawRow], column: &str) -> MappedRows<String> {
    let mapped = map_rows(rows, |row| optional_label(row, column));
    MappedRows {
        records: mapped.records.into_iter().flatten().collect(),
        malformed: mapped.malformed,
    }
}

/// Earliest and latest timestamps from the date range row.
///
/// An empty result or null bounds (empty datasource) map to `None`.
///
/// # Errors
///
/// Returns [`MalformedRow`] if a bound column is missing or not text.
pub fn date_range(rows: &[RawRow]) -> Result<(Option<String>, Option<String>), MalformedRow> {
    let Some(row) = rows.first() else {
        return Ok((None, None));
    };
    Ok((
        optional_label(row, MIN_DATE)?,
        optional_label(row, MAX_DATE)?,
    ))
}
