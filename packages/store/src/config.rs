//! Store connection configuration.

use std::time::Duration;

/// Default broker base URL.
pub const DEFAULT_BROKER_URL: &str = "http://localhost:8082";

/// Path of the SQL endpoint on the broker.
pub const SQL_ENDPOINT_PATH: &str = "/druid/v2/sql";

/// Default datasource holding the prepared dataset.
pub const DEFAULT_DATASOURCE: &str = "inline_data";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the analytical store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Broker base URL, without a trailing slash.
    pub broker_url: String,
    /// Datasource (table) queried by every view.
    pub datasource: String,
    /// Upper bound on a single request, connect through body.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broker_url: DEFAULT_BROKER_URL.to_string(),
            datasource: DEFAULT_DATASOURCE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl StoreConfig {
    /// Reads the configuration from `DRUID_BROKER_URL`, `DRUID_DATASOURCE`
    /// and `DRUID_TIMEOUT_SECS`, falling back to defaults for anything
    /// unset or invalid.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let broker_url = lookup("DRUID_BROKER_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.broker_url);

        let datasource = lookup("DRUID_DATASOURCE")
            .map(|ds| ds.trim().to_string())
            .filter(|ds| !ds.is_empty())
            .unwrap_or(defaults.datasource);

        let timeout = match lookup("DRUID_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    log::warn!(
                        "Ignoring invalid DRUID_TIMEOUT_SECS={raw:?}, using {DEFAULT_TIMEOUT_SECS}s"
                    );
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            broker_url,
            datasource,
            timeout,
        }
    }

    /// Full URL of the SQL endpoint.
    #[must_use]
    pub fn sql_endpoint(&self) -> String {
        format!("{}{SQL_ENDPOINT_PATH}", self.broker_url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = StoreConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.sql_endpoint(), "http://localhost:8082/druid/v2/sql");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_overrides_and_strips_trailing_slash() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("DRUID_BROKER_URL", "http://druid:8888/"),
            ("DRUID_DATASOURCE", "idsp_weekly"),
            ("DRUID_TIMEOUT_SECS", "5"),
        ]));
        assert_eq!(config.sql_endpoint(), "http://druid:8888/druid/v2/sql");
        assert_eq!(config.datasource, "idsp_weekly");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        for raw in ["abc", "0", "-3"] {
            let config = StoreConfig::from_lookup(lookup_from(&[("DRUID_TIMEOUT_SECS", raw)]));
            assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        }
    }
}
