//! SQL statements for each analytical view.
//!
//! Every function is pure: it takes the datasource name and validated
//! parameters and returns a [`SqlStatement`]. Request values are always
//! bound as `?` parameters, never spliced into the SQL text. The
//! datasource comes from server configuration and is emitted as a quoted
//! identifier.
//!
//! Output column aliases are the contract with [`crate::mapping`]; the
//! `pub const` names below are shared by both sides.

use epi_dash_analytics_models::{
    ClimateImpactParams, MapParams, TOP_DISEASES_LIMIT, TopDiseasesParams, TrendParams,
};
use epi_dash_store_models::{SqlParameter, SqlStatement};

/// Week bucket alias.
pub const WEEK: &str = "week";
/// Summed case count alias.
pub const TOTAL_CASES: &str = "total_cases";
/// Mean temperature alias (Kelvin in the store).
pub const AVG_TEMP: &str = "avg_temp";
/// Mean precipitation alias.
pub const AVG_PRECIPITATION: &str = "avg_precipitation";
/// Mean leaf area index alias.
pub const AVG_LAI: &str = "avg_lai";
/// Mean latitude alias.
pub const LATITUDE: &str = "latitude";
/// Mean longitude alias.
pub const LONGITUDE: &str = "longitude";
/// District column.
pub const DISTRICT: &str = "district";
/// State/UT column.
pub const STATE_UT: &str = "state_ut";
/// Disease column.
pub const DISEASE: &str = "Disease";
/// Earliest timestamp alias.
pub const MIN_DATE: &str = "min_date";
/// Latest timestamp alias.
pub const MAX_DATE: &str = "max_date";

/// Rows whose climate readings are all present.
const CLIMATE_NOT_NULL: &str =
    r#""Temp" IS NOT NULL AND "preci" IS NOT NULL AND "LAI" IS NOT NULL"#;

/// A column that can be enumerated for filter dropdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Distinct disease names.
    Disease,
    /// Distinct state/UT names.
    StateUt,
}

impl Dimension {
    /// Column name in the datasource, which is also the output key.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Disease => DISEASE,
            Self::StateUt => STATE_UT,
        }
    }
}

/// Quotes an SQL identifier, doubling any embedded quotes.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Weekly case totals for one state and disease, ascending by week.
#[must_use]
pub fn trend(datasource: &str, params: &TrendParams) -> SqlStatement {
    let table = quote_ident(datasource);
    SqlStatement::new(format!(
        r#"SELECT DATE_TRUNC('week', "__time") AS "week",
       SUM("Cases") AS "total_cases"
FROM {table}
WHERE "state_ut" = ? AND "Disease" = ?
GROUP BY DATE_TRUNC('week', "__time")
ORDER BY "week" ASC"#
    ))
    .bind(SqlParameter::varchar(&params.state_ut))
    .bind(SqlParameter::varchar(&params.disease))
}

/// Top diseases in a state by all-time case count.
///
/// Null case counts are coalesced to zero before summing and diseases
/// whose total is not positive are excluded. The stored state name is
/// trimmed before comparison so whitespace variants are folded together.
#[must_use]
pub fn top_diseases(datasource: &str, params: &TopDiseasesParams) -> SqlStatement {
    let table = quote_ident(datasource);
    SqlStatement::new(format!(
        r#"SELECT "Disease",
       SUM(COALESCE("Cases", 0)) AS "total_cases"
FROM {table}
WHERE TRIM("state_ut") = ?
GROUP BY "Disease"
HAVING SUM(COALESCE("Cases", 0)) > 0
ORDER BY "total_cases" DESC
LIMIT {TOP_DISEASES_LIMIT}"#
    ))
    .bind(SqlParameter::varchar(&params.state_ut))
}

/// Dataset-wide climate averages for a disease.
#[must_use]
pub fn climate_metrics(datasource: &str, params: &ClimateImpactParams) -> SqlStatement {
    let table = quote_ident(datasource);
    SqlStatement::new(format!(
        r#"SELECT AVG("Temp") AS "avg_temp",
       AVG("preci") AS "avg_precipitation",
       AVG("LAI") AS "avg_lai"
FROM {table}
WHERE "Disease" = ? AND {CLIMATE_NOT_NULL}"#
    ))
    .bind(SqlParameter::varchar(&params.disease))
}

/// Weekly case totals and climate averages for a disease.
#[must_use]
pub fn climate_series(datasource: &str, params: &ClimateImpactParams) -> SqlStatement {
    let table = quote_ident(datasource);
    SqlStatement::new(format!(
        r#"SELECT DATE_TRUNC('week', "__time") AS "week",
       SUM("Cases") AS "total_cases",
       AVG("Temp") AS "avg_temp",
       AVG("preci") AS "avg_precipitation",
       AVG("LAI") AS "avg_lai"
FROM {table}
WHERE "Disease" = ? AND {CLIMATE_NOT_NULL}
GROUP BY DATE_TRUNC('week', "__time")
ORDER BY "week" ASC"#
    ))
    .bind(SqlParameter::varchar(&params.disease))
}

/// Per-district case totals for one week, with averaged coordinates.
///
/// The week is bound as a `TIMESTAMP` parameter and compared with the
/// week-truncated row time, so it must be the start of a week to match.
#[must_use]
pub fn map(datasource: &str, params: &MapParams) -> SqlStatement {
    let table = quote_ident(datasource);
    SqlStatement::new(format!(
        r#"SELECT "district",
       "state_ut",
       AVG("Latitude") AS "latitude",
       AVG("Longitude") AS "longitude",
       SUM("Cases") AS "total_cases"
FROM {table}
WHERE DATE_TRUNC('week', "__time") = ?
  AND "Disease" = ?
  AND "Latitude" IS NOT NULL
  AND "Longitude" IS NOT NULL
GROUP BY "district", "state_ut"
HAVING SUM("Cases") > 0
ORDER BY "total_cases" DESC"#
    ))
    .bind(SqlParameter::timestamp(&params.week))
    .bind(SqlParameter::varchar(&params.disease))
}

/// Distinct values of a dimension, ascending.
#[must_use]
pub fn distinct_values(datasource: &str, dimension: Dimension) -> SqlStatement {
    let table = quote_ident(datasource);
    let column = quote_ident(dimension.column());
    SqlStatement::new(format!(
        "SELECT DISTINCT {column}\nFROM {table}\nORDER BY {column} ASC"
    ))
}

/// Earliest and latest row timestamps.
#[must_use]
pub fn date_range(datasource: &str) -> SqlStatement {
    let table = quote_ident(datasource);
    SqlStatement::new(format!(
        r#"SELECT MIN("__time") AS "min_date",
       MAX("__time") AS "max_date"
FROM {table}"#
    ))
}

#[cfg(test)]
mod tests {
    use epi_dash_store_models::SqlType;

    use super::*;

    const DS: &str = "inline_data";

    fn values(stmt: &SqlStatement) -> Vec<&str> {
        stmt.parameters
            .iter()
            .filter_map(|p| p.value.as_str())
            .collect()
    }

    #[test]
    fn trend_binds_region_and_disease() {
        let stmt = trend(
            DS,
            &TrendParams {
                state_ut: "Kerala".to_string(),
                disease: "Dengue".to_string(),
            },
        );

        assert!(stmt.query.contains(r#"FROM "inline_data""#));
        assert!(stmt.query.contains(r#"WHERE "state_ut" = ? AND "Disease" = ?"#));
        assert!(stmt.query.contains(r#"ORDER BY "week" ASC"#));
        assert_eq!(stmt.placeholder_count(), 2);
        assert_eq!(values(&stmt), ["Kerala", "Dengue"]);
    }

    #[test]
    fn filter_values_never_reach_the_sql_text() {
        let hostile = "Kerala' OR '1'='1";
        let stmt = trend(
            DS,
            &TrendParams {
                state_ut: hostile.to_string(),
                disease: "x\"; DROP TABLE t; --".to_string(),
            },
        );

        assert!(!stmt.query.contains("OR '1'='1"));
        assert!(!stmt.query.contains("DROP TABLE"));
        assert_eq!(values(&stmt)[0], hostile);
    }

    #[test]
    fn top_diseases_coalesces_trims_and_limits() {
        let stmt = top_diseases(
            DS,
            &TopDiseasesParams {
                state_ut: "Kerala".to_string(),
                week: Some("2024-01-01".to_string()),
            },
        );

        assert!(stmt.query.contains(r#"SUM(COALESCE("Cases", 0)) AS "total_cases""#));
        assert!(stmt.query.contains(r#"WHERE TRIM("state_ut") = ?"#));
        assert!(stmt.query.contains(r#"HAVING SUM(COALESCE("Cases", 0)) > 0"#));
        assert!(stmt.query.contains(r#"ORDER BY "total_cases" DESC"#));
        assert!(stmt.query.ends_with("LIMIT 5"));
        // The week is not a filter for the ranking.
        assert_eq!(values(&stmt), ["Kerala"]);
    }

    #[test]
    fn empty_filter_is_still_a_literal_value() {
        let stmt = top_diseases(
            DS,
            &TopDiseasesParams {
                state_ut: String::new(),
                week: None,
            },
        );
        assert_eq!(stmt.placeholder_count(), 1);
        assert_eq!(values(&stmt), [""]);
    }

    #[test]
    fn climate_queries_share_filters() {
        let params = ClimateImpactParams {
            disease: "Malaria".to_string(),
        };
        let metrics = climate_metrics(DS, &params);
        let series = climate_series(DS, &params);

        for stmt in [&metrics, &series] {
            assert!(stmt.query.contains(CLIMATE_NOT_NULL));
            assert!(stmt.query.contains(r#"AVG("Temp") AS "avg_temp""#));
            assert_eq!(values(stmt), ["Malaria"]);
        }
        assert!(!metrics.query.contains("GROUP BY"));
        assert!(series.query.contains(r#"SUM("Cases") AS "total_cases""#));
        assert!(series.query.contains(r#"ORDER BY "week" ASC"#));
    }

    #[test]
    fn map_binds_week_as_timestamp() {
        let stmt = map(
            DS,
            &MapParams {
                week: "2024-01-01".to_string(),
                disease: "Dengue".to_string(),
            },
        );

        assert!(stmt.query.contains(r#"AVG("Latitude") AS "latitude""#));
        assert!(stmt.query.contains(r#"GROUP BY "district", "state_ut""#));
        assert!(stmt.query.contains(r#"HAVING SUM("Cases") > 0"#));
        assert_eq!(stmt.parameters[0].sql_type, SqlType::Timestamp);
        assert_eq!(stmt.parameters[1].sql_type, SqlType::Varchar);
        assert_eq!(values(&stmt), ["2024-01-01", "Dengue"]);
    }

    #[test]
    fn enumeration_queries_take_no_parameters() {
        let diseases = distinct_values(DS, Dimension::Disease);
        assert_eq!(
            diseases.query,
            "SELECT DISTINCT \"Disease\"\nFROM \"inline_data\"\nORDER BY \"Disease\" ASC"
        );
        assert!(diseases.parameters.is_empty());

        let range = date_range(DS);
        assert!(range.query.contains(r#"MIN("__time") AS "min_date""#));
        assert_eq!(range.placeholder_count(), 0);
    }

    #[test]
    fn datasource_identifier_is_quoted() {
        assert_eq!(quote_ident("inline_data"), "\"inline_data\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
