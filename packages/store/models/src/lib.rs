#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Types exchanged with the analytical store.
//!
//! A [`SqlStatement`] is what the query builder produces and the store
//! client sends; a [`RawRow`] is what comes back. Row values are kept as
//! a tagged [`ScalarValue`] so that the result mapper has to narrow every
//! field explicitly instead of trusting whatever JSON type the store
//! happened to emit.

use std::collections::BTreeMap;

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// A single dynamically-typed cell returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// SQL `NULL` (no matching data).
    Null,
    /// Boolean cell.
    Bool(bool),
    /// Integral numeric cell.
    Integer(i64),
    /// Floating point numeric cell.
    Float(f64),
    /// Text cell (also used for timestamps, which the store renders as
    /// ISO 8601 strings).
    String(String),
}

impl ScalarValue {
    /// Returns `true` for [`ScalarValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the inner string for [`ScalarValue::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl From<serde_json::Value> for ScalarValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| n.as_f64().map_or(Self::Null, Self::Float), Self::Integer),
            serde_json::Value::String(s) => Self::String(s),
            // Nested values never come back from the queries we issue;
            // keep their JSON text so the mapper can report them.
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Self::String(other.to_string())
            }
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// One result row, keyed by output column alias.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    columns: BTreeMap<String, ScalarValue>,
}

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: BTreeMap::new(),
        }
    }

    /// Adds a column, returning the row (builder style, mostly for tests
    /// and fixtures).
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<ScalarValue>) -> Self {
        self.columns.insert(column.to_string(), value.into());
        self
    }

    /// Returns the value for `column`, or `None` when the store did not
    /// return that column at all.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ScalarValue> {
        self.columns.get(column)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawRow {
    fn from(object: serde_json::Map<String, serde_json::Value>) -> Self {
        object
            .into_iter()
            .map(|(k, v)| (k, ScalarValue::from(v)))
            .collect()
    }
}

impl FromIterator<(String, ScalarValue)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (String, ScalarValue)>>(iter: T) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// SQL type of a dynamic parameter, as named by the store's SQL API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlType {
    /// Character data.
    Varchar,
    /// Timestamp literal (`YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`).
    Timestamp,}

/// A positional `?` parameter bound to a [`SqlStatement`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlParameter {
    /// Declared SQL type.
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    /// Parameter value.
    pub value: serde_json::Value,
}

impl SqlParameter {
    /// A `VARCHAR` parameter.
    #[must_use]
    pub fn varchar(value: impl Into<String>) -> Self {
        Self {
            sql_type: SqlType::Varchar,
            value: serde_json::Value::String(value.into()),
        }
    }

    /// A `TIMESTAMP` parameter. The value is passed through verbatim;
    /// malformed dates are rejected by the store, not here.
    #[must_use]
    pub fn timestamp(value: impl Into<String>) -> Self {
        Self {
            sql_type: SqlType::Timestamp,
            value: serde_json::Value::String(value.into()),
        }
    }
}

/// A SQL statement together with its bind parameters.
///
/// Serializes directly to the store's request body:
/// `{"query": "...", "parameters": [{"type": "VARCHAR", "value": "..."}]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlStatement {
    /// SQL text with `?` placeholders.
    pub query: String,
    /// Parameters in placeholder order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SqlParameter>,
}

impl SqlStatement {
    /// Creates a statement with no parameters.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            parameters: Vec::new(),
        }
    }

    /// Appends a bind parameter.
    #[must_use]
    pub fn bind(mut self, parameter: SqlParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Number of `?` placeholders in the query text.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.query.matches('?').count()
    }
}
