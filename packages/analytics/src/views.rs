//! One function per analytical view.
//!
//! Each view builds its statement(s), executes them against the store,
//! maps the rows and assembles the response envelope. Store and
//! single-row mapping failures propagate unchanged; per-record mapping
//! failures are logged and dropped by [`MappedRows::into_records`].
//!
//! [`MappedRows::into_records`]: crate::mapping::MappedRows::into_records

use epi_dash_analytics_models::{
    ALL_TIME_LABEL, ClimateImpactParams, ClimateImpactResponse, ClimateMetrics,
    DateRangeResponse, DiseasesResponse, MapParams, MapResponse, StatesResponse,
    TopDiseasesParams, TopDiseasesResponse, TrendParams, TrendResponse,
};
use epi_dash_store::Store;

use crate::queries::{self, Dimension};
use crate::{AnalyticsError, mapping};

/// Weekly case trend for a state and disease.
///
/// No matching rows is a valid, empty trend.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store call fails.
pub async fn trend(
    store: &dyn Store,
    params: TrendParams,
) -> Result<TrendResponse, AnalyticsError> {
    let stmt = queries::trend(store.datasource(), &params);
    let rows = store.execute(&stmt).await?;
    let data = mapping::trend_series(&rows).into_records("trend");

    Ok(TrendResponse {
        state_ut: params.state_ut,
        disease: params.disease,
        data,
    })
}

/// All-time top diseases for a state.
///
/// An empty ranking is still a successful response labelled
/// [`ALL_TIME_LABEL`].
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store call fails.
pub async fn top_diseases(
    store: &dyn Store,
    params: TopDiseasesParams,
) -> Result<TopDiseasesResponse, AnalyticsError> {
    log::info!("Fetching top diseases for state: {}", params.state_ut);

    let stmt = queries::top_diseases(store.datasource(), &params);
    let rows = store.execute(&stmt).await?;
    let diseases = mapping::disease_rankings(&rows).into_records("top-diseases");

    if diseases.is_empty() {
        log::warn!("No data found for state: {}", params.state_ut);
    }

    Ok(TopDiseasesResponse {
        state_ut: params.state_ut,
        week: ALL_TIME_LABEL.to_string(),
        diseases,
    })
}

/// Climate averages and weekly climate series for a disease.
///
/// The two statements are independent and run concurrently.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if either store call fails or the metrics
/// row is malformed.
pub async fn climate_impact(
    store: &dyn Store,
    params: ClimateImpactParams,
) -> Result<ClimateImpactResponse, AnalyticsError> {
    let metrics_stmt = queries::climate_metrics(store.datasource(), &params);
    let series_stmt = queries::climate_series(store.datasource(), &params);

    let (metrics_rows, series_rows) = futures::try_join!(
        store.execute(&metrics_stmt),
        store.execute(&series_stmt)
    )?;

    let climate_metrics = match metrics_rows.first() {
        Some(row) => mapping::climate_metrics(row)?,
        None => ClimateMetrics::default(),
    };
    let time_series = mapping::climate_series(&series_rows).into_records("climate-impact");

    Ok(ClimateImpactResponse {
        disease: params.disease,
        climate_metrics,
        time_series,
    })
}

/// District case map for one week and disease.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store call fails, including when the
/// store rejects a malformed week.
pub async fn map(store: &dyn Store, params: MapParams) -> Result<MapResponse, AnalyticsError> {
    let stmt = queries::map(store.datasource(), &params);
    let rows = store.execute(&stmt).await?;
    let locations = mapping::geo_points(&rows).into_records("map");

    Ok(MapResponse {
        week: params.week,
        disease: params.disease,
        locations,
    })
}

/// All disease names in the dataset.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store call fails or every row
/// lacks the enumerated column.
pub async fn diseases(store: &dyn Store) -> Result<DiseasesResponse, AnalyticsError> {
    let stmt = queries::distinct_values(store.datasource(), Dimension::Disease);
    let rows = store.execute(&stmt).await?;

    Ok(DiseasesResponse {
        diseases: mapping::dimension_values(&rows, Dimension::Disease.column())
            .into_nonempty_records("diseases")?,
    })
}

/// All state/UT names in the dataset.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store call fails or every row
/// lacks the enumerated column.
pub async fn states(store: &dyn Store) -> Result<StatesResponse, AnalyticsError> {
    let stmt = queries::distinct_values(store.datasource(), Dimension::StateUt);
    let rows = store.execute(&stmt).await?;

    Ok(StatesResponse {
        states: mapping::dimension_values(&rows, Dimension::StateUt.column())
            .into_nonempty_records("states")?,
    })
}

/// First and last timestamps in the dataset.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store call fails or a bound column
/// is missing or not text.
pub async fn date_range(store: &dyn Store) -> Result<DateRangeResponse, AnalyticsError> {
    let stmt = queries::date_range(store.datasource());
    let rows = store.execute(&stmt).await?;
    let (min_date, max_date) = mapping::date_range(&rows)?;

    Ok(DateRangeResponse { min_date, max_date })
}
