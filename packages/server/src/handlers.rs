//! HTTP handler functions for the analytics API.

use actix_web::{HttpResponse, web};
use epi_dash_analytics::validate::{optional, required};
use epi_dash_analytics::{AnalyticsError, views};
use epi_dash_analytics_models::{ClimateImpactParams, MapParams, TopDiseasesParams, TrendParams};
use epi_dash_server_models::{
    ApiError, ApiHealth, ClimateImpactQuery, MapQuery, TopDiseasesQuery, TrendQuery,
};
use epi_dash_store::StoreError;
use serde::Serialize;

use crate::AppState;

/// `GET /`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        message: "Epidemiological Data Analytics API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /trend?state_ut=..&disease=..`
pub async fn trend(state: web::Data<AppState>, query: web::Query<TrendQuery>) -> HttpResponse {
    let params = match trend_params(&query) {
        Ok(params) => params,
        Err(e) => return error_response("trend", &e),
    };
    respond("trend", views::trend(state.store.as_ref(), params).await)
}

/// `GET /top-diseases?state_ut=..[&week=..]`
pub async fn top_diseases(
    state: web::Data<AppState>,
    query: web::Query<TopDiseasesQuery>,
) -> HttpResponse {
    let params = match top_diseases_params(&query) {
        Ok(params) => params,
        Err(e) => return error_response("top-diseases", &e),
    };
    respond(
        "top-diseases",
        views::top_diseases(state.store.as_ref(), params).await,
    )
}

/// `GET /climate-impact?disease=..`
pub async fn climate_impact(
    state: web::Data<AppState>,
    query: web::Query<ClimateImpactQuery>,
) -> HttpResponse {
    let params = match required(query.disease.as_deref(), "disease") {
        Ok(disease) => ClimateImpactParams { disease },
        Err(e) => return error_response("climate-impact", &e),
    };
    respond(
        "climate-impact",
        views::climate_impact(state.store.as_ref(), params).await,
    )
}

/// `GET /map?week=..&disease=..`
pub async fn map(state: web::Data<AppState>, query: web::Query<MapQuery>) -> HttpResponse {
    let params = match map_params(&query) {
        Ok(params) => params,
        Err(e) => return error_response("map", &e),
    };
    respond("map", views::map(state.store.as_ref(), params).await)
}

/// `GET /diseases`
pub async fn diseases(state: web::Data<AppState>) -> HttpResponse {
    respond("diseases", views::diseases(state.store.as_ref()).await)
}

/// `GET /states`
pub async fn states(state: web::Data<AppState>) -> HttpResponse {
    respond("states", views::states(state.store.as_ref()).await)
}

/// `GET /weeks`
pub async fn date_range(state: web::Data<AppState>) -> HttpResponse {
    respond("weeks", views::date_range(state.store.as_ref()).await)
}

fn trend_params(query: &TrendQuery) -> Result<TrendParams, AnalyticsError> {
    Ok(TrendParams {
        state_ut: required(query.state_ut.as_deref(), "state_ut")?,
        disease: required(query.disease.as_deref(), "disease")?,
    })
}

fn top_diseases_params(query: &TopDiseasesQuery) -> Result<TopDiseasesParams, AnalyticsError> {
    Ok(TopDiseasesParams {
        state_ut: required(query.state_ut.as_deref(), "state_ut")?,
        week: optional(query.week.as_deref()),
    })
}

fn map_params(query: &MapQuery) -> Result<MapParams, AnalyticsError> {
    Ok(MapParams {
        week: required(query.week.as_deref(), "week")?,
        disease: required(query.disease.as_deref(), "disease")?,
    })
}

fn respond<T: Serialize>(view: &str, result: Result<T, AnalyticsError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(view, &e),
    }
}

/// Translates an [`AnalyticsError`] into the API's error response.
///
/// Bad requests are the caller's problem and map to 400. Everything else
/// is a 500 carrying the original message. A rejected query means the
/// generated SQL is wrong, so it is logged louder than an unreachable
/// store.
fn error_response(view: &str, err: &AnalyticsError) -> HttpResponse {
    match err {
        AnalyticsError::BadRequest { .. } => {
            log::debug!("{view}: bad request: {err}");
            return HttpResponse::BadRequest().json(ApiError::new(err));
        }
        AnalyticsError::Store(StoreError::Unavailable { .. }) => {
            log::warn!("{view}: {err}");
        }
        AnalyticsError::Store(StoreError::Rejected { .. } | StoreError::InvalidResponse { .. })
        | AnalyticsError::MalformedRow(_) => {
            log::error!("{view}: {err}");
        }
    }
    HttpResponse::InternalServerError().json(ApiError::new(err))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use epi_dash_store::fixture::FixtureStore;
    use epi_dash_store_models::{RawRow, ScalarValue, SqlStatement};

    use super::*;
    use crate::routes;

    /// `(state_ut, Disease, Cases)` rows as stored upstream.
    const SURVEILLANCE_ROWS: &[(&str, &str, Option<i64>)] = &[
        ("Kerala", "Dengue", Some(120)),
        ("Kerala", "Malaria", None),
        ("Kerala ", "Dengue", Some(30)),
        ("Goa", "Cholera", Some(8)),
    ];

    /// Evaluates the top-diseases statement over [`SURVEILLANCE_ROWS`]:
    /// trimmed region match, nulls summed as zero, positive totals only,
    /// descending.
    fn rank_fixture(stmt: &SqlStatement) -> Vec<RawRow> {
        let region = stmt.parameters[0].value.as_str().unwrap_or_default();
        let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
        for (state_ut, disease, cases) in SURVEILLANCE_ROWS {
            if state_ut.trim() == region {
                *totals.entry(*disease).or_insert(0) += cases.unwrap_or(0);
            }
        }
        let mut ranked: Vec<(&str, i64)> = totals.into_iter().filter(|(_, n)| *n > 0).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(5)
            .map(|(disease, n)| RawRow::new().with("Disease", disease).with("total_cases", n))
            .collect()
    }

    fn state_for(store: &Arc<FixtureStore>) -> web::Data<AppState> {
        web::Data::new(AppState {
            store: store.clone(),
        })
    }

    #[actix_web::test]
    async fn health_reports_running() {
        let store = Arc::new(FixtureStore::with_rows(vec![]));
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(routes)).await;

        let resp: ApiHealth =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert!(resp.message.contains("running"));
        assert!(store.executed().is_empty());
    }

    #[actix_web::test]
    async fn top_diseases_sums_whitespace_variants_and_drops_zero_totals() {
        let store = Arc::new(FixtureStore::new(|stmt| Ok(rank_fixture(stmt))));
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(routes)).await;

        let req = test::TestRequest::get()
            .uri("/top-diseases?state_ut=Kerala")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            serde_json::json!({
                "state_ut": "Kerala",
                "week": "All Time",
                "diseases": [{"disease": "Dengue", "total_cases": 150}],
            })
        );
    }

    #[actix_web::test]
    async fn top_diseases_trims_the_requested_state() {
        let store = Arc::new(FixtureStore::new(|stmt| Ok(rank_fixture(stmt))));
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(routes)).await;

        let req = test::TestRequest::get()
            .uri("/top-diseases?state_ut=%20%20Goa%20&week=2024-01-01")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["state_ut"], "Goa");
        assert_eq!(body["week"], "All Time");
        assert_eq!(body["diseases"][0]["disease"], "Cholera");
        assert_eq!(
            store.executed()[0].parameters[0].value,
            serde_json::json!("Goa")
        );
    }

    #[actix_web::test]
    async fn top_diseases_for_unknown_state_is_an_empty_success() {
        let store = Arc::new(FixtureStore::new(|stmt| Ok(rank_fixture(stmt))));
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(routes)).await;

        let req = test::TestRequest::get()
            .uri("/top-diseases?state_ut=Sikkim")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["week"], "All Time");
        assert_eq!(body["diseases"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn missing_parameter_is_rejected_before_querying() {
        let store = Arc::new(FixtureStore::with_rows(vec![]));
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(routes)).await;

        for uri in [
            "/trend?state_ut=Kerala",
            "/top-diseases",
            "/climate-impact",
            "/map?disease=Dengue",
        ] {
            let resp =
                test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body: ApiError = test::read_body_json(resp).await;
            assert!(body.detail.starts_with("Missing required query parameter"), "{uri}");
        }

        assert!(store.executed().is_empty());
    }

    #[actix_web::test]
    async fn trend_maps_null_cases_to_zero() {
        let store = Arc::new(FixtureStore::with_rows(vec![
            RawRow::new()
                .with("week", "2024-01-01T00:00:00.000Z")
                .with("total_cases", 11_i64),
            RawRow::new()
                .with("week", "2024-01-08T00:00:00.000Z")
                .with("total_cases", ScalarValue::Null),
        ]));
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(routes)).await;

        let req = test::TestRequest::get()
            .uri("/trend?state_ut=Kerala&disease=Dengue")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            serde_json::json!({
                "state_ut": "Kerala",
                "disease": "Dengue",
                "data": [
                    {"week": "2024-01-01T00:00:00.000Z", "cases": 11},
                    {"week": "2024-01-08T00:00:00.000Z", "cases": 0},
                ],
            })
        );
    }

    #[actix_web::test]
    async fn store_failures_become_server_errors_with_detail() {
        let store = Arc::new(FixtureStore::new(|_| {
            Err(StoreError::Unavailable {
                message: "could not connect to http://localhost:8082/druid/v2/sql".to_string(),
            })
        }));
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(routes)).await;

        for uri in ["/diseases", "/states", "/weeks", "/climate-impact?disease=Dengue"] {
            let resp =
                test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            let body: ApiError = test::read_body_json(resp).await;
            assert!(body.detail.contains("could not connect"), "{uri}");
        }
    }

    #[actix_web::test]
    async fn map_echoes_week_and_disease() {
        let store = Arc::new(FixtureStore::with_rows(vec![
            RawRow::new()
                .with("district", "Kozhikode")
                .with("state_ut", "Kerala")
                .with("latitude", 11.25)
                .with("longitude", 75.78)
                .with("total_cases", 14_i64),
        ]));
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(routes)).await;

        let req = test::TestRequest::get()
            .uri("/map?week=2024-01-01&disease=Dengue")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["week"], "2024-01-01");
        assert_eq!(body["disease"], "Dengue");
        assert_eq!(body["locations"][0]["district"], "Kozhikode");
        assert_eq!(body["locations"][0]["total_cases"], 14);
    }

    #[actix_web::test]
    async fn enumeration_with_unexpected_columns_is_a_server_error() {
        let store = Arc::new(FixtureStore::with_rows(vec![
            RawRow::new().with("disease", "Dengue"),
        ]));
        let app =
            test::init_service(App::new().app_data(state_for(&store)).configure(routes)).await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/diseases").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ApiError = test::read_body_json(resp).await;
        assert_eq!(body.detail, "Malformed row: column 'Disease' is missing");
    }
}
