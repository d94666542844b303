#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response types for the analytical views.
//!
//! Parameter structs hold already-validated, trimmed filter values. The
//! record and envelope structs serialize to the JSON contract consumed by
//! the dashboard frontend, so their field names are part of the wire
//! format and stay `snake_case`.

use serde::{Deserialize, Serialize};

/// Label used for the `week` field of the top-diseases envelope. The
/// ranking always spans the whole dataset.
pub const ALL_TIME_LABEL: &str = "All Time";

/// Maximum number of entries in a disease ranking.
pub const TOP_DISEASES_LIMIT: usize = 5;

/// Parameters for the weekly case trend view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendParams {
    /// State/UT name.
    pub state_ut: String,
    /// Disease name.
    pub disease: String,
}

/// Parameters for the top-diseases ranking view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopDiseasesParams {
    /// State/UT name, matched against the trimmed stored value.
    pub state_ut: String,
    /// Week requested by the caller. Accepted for compatibility with the
    /// frontend but not used as a filter.
    pub week: Option<String>,
}

/// Parameters for the climate impact view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateImpactParams {
    /// Disease name.
    pub disease: String,
}

/// Parameters for the district map view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapParams {
    /// Week start date (`YYYY-MM-DD`), passed to the store verbatim.
    pub week: String,
    /// Disease name.
    pub disease: String,
}

/// Weekly case count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Week bucket label as returned by the store.
    pub week: String,
    /// Total cases in the week.
    pub cases: u64,
}

/// A disease and its summed case count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRanking {
    /// Disease name.
    pub disease: String,
    /// Total cases, nulls counted as zero.
    pub total_cases: u64,
}

/// Dataset-wide climate averages for a disease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateMetrics {
    /// Mean temperature in degrees Celsius.
    pub avg_temp: f64,
    /// Mean precipitation.
    pub avg_precipitation: f64,
    /// Mean leaf area index.
    pub avg_lai: f64,
}

/// One week of the climate impact time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateDataPoint {
    /// Week bucket label.
    pub week: String,
    /// Total cases in the week.
    pub cases: u64,
    /// Mean temperature in degrees Celsius.
    pub temp: f64,
    /// Mean precipitation.
    pub precipitation: f64,
    /// Mean leaf area index.
    pub lai: f64,
}

/// A district on the case map.
///
/// The coordinates are the average over every row reported for the
/// district in the selected week, not a surveyed centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// District name.
    pub district: String,
    /// State/UT the district belongs to.
    pub state_ut: String,
    /// Mean latitude.
    pub latitude: f64,
    /// Mean longitude.
    pub longitude: f64,
    /// Total cases in the week.
    pub total_cases: u64,
}

/// Envelope for `GET /trend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendResponse {
    /// Echoed state/UT.
    pub state_ut: String,
    /// Echoed disease.
    pub disease: String,
    /// Weekly points, ascending by week.
    pub data: Vec<TimeSeriesPoint>,
}

/// Envelope for `GET /top-diseases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopDiseasesResponse {
    /// Echoed (trimmed) state/UT.
    pub state_ut: String,
    /// Always [`ALL_TIME_LABEL`].
    pub week: String,
    /// Up to [`TOP_DISEASES_LIMIT`] diseases, descending by total.
    pub diseases: Vec<DiseaseRanking>,
}

/// Envelope for `GET /climate-impact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateImpactResponse {
    /// Echoed disease.
    pub disease: String,
    /// Dataset-wide averages.
    pub climate_metrics: ClimateMetrics,
    /// Weekly series, ascending by week.
    pub time_series: Vec<ClimateDataPoint>,
}

/// Envelope for `GET /map`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapResponse {
    /// Echoed week.
    pub week: String,
    /// Echoed disease.
    pub disease: String,
    /// Districts with cases, descending by total.
    pub locations: Vec<GeoPoint>,
}

/// Envelope for `GET /diseases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseasesResponse {
    /// Distinct disease names, ascending.
    pub diseases: Vec<String>,
}

/// Envelope for `GET /states`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatesResponse {
    /// Distinct state/UT names, ascending.
    pub states: Vec<String>,
}

/// Envelope for `GET /weeks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeResponse {
    /// Earliest timestamp in the dataset, `null` when it is empty.
    pub min_date: Option<String>,
    /// Latest timestamp in the dataset, `null` when it is empty.
    pub max_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_diseases_envelope_wire_shape() {
        let resp = TopDiseasesResponse {
            state_ut: "Kerala".to_string(),
            week: ALL_TIME_LABEL.to_string(),
            diseases: vec![DiseaseRanking {
                disease: "Dengue".to_string(),
                total_cases: 150,
            }],
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            serde_json::json!({
                "state_ut": "Kerala",
                "week": "All Time",
                "diseases": [{"disease": "Dengue", "total_cases": 150}],
            })
        );
    }

    #[test]
    fn empty_date_range_serializes_nulls() {
        assert_eq!(
            serde_json::to_value(DateRangeResponse::default()).unwrap(),
            serde_json::json!({"min_date": null, "max_date": null})
        );
    }
}
