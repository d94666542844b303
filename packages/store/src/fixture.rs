//! In-process [`Store`] for tests.
//!
//! A [`FixtureStore`] answers every statement through a responder
//! closure and records what it was asked, so callers can assert both on
//! the rows they map and on the SQL they generated.

use std::sync::Mutex;

use async_trait::async_trait;
use epi_dash_store_models::{RawRow, SqlStatement};

use crate::{Store, StoreError};

type Responder = dyn Fn(&SqlStatement) -> Result<Vec<RawRow>, StoreError> + Send + Sync;

/// Scriptable store that records executed statements.
pub struct FixtureStore {
    datasource: String,
    responder: Box<Responder>,
    executed: Mutex<Vec<SqlStatement>>,
}

impl FixtureStore {
    /// Creates a store that answers with `responder`.
    pub fn new(
        responder: impl Fn(&SqlStatement) -> Result<Vec<RawRow>, StoreError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            datasource: crate::config::DEFAULT_DATASOURCE.to_string(),
            responder: Box::new(responder),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Creates a store that returns the same rows for every statement.
    #[must_use]
    pub fn with_rows(rows: Vec<RawRow>) -> Self {
        Self::new(move |_| Ok(rows.clone()))
    }

    /// Statements executed so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the recording mutex is poisoned.
    #[must_use]
    pub fn executed(&self) -> Vec<SqlStatement> {
        self.executed
            .lock()
            .expect("fixture store mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl Store for FixtureStore {
    fn datasource(&self) -> &str {
        &self.datasource
    }

    async fn execute(&self, statement: &SqlStatement) -> Result<Vec<RawRow>, StoreError> {
        self.executed
            .lock()
            .expect("fixture store mutex poisoned")
            .push(statement.clone());
        (self.responder)(statement)
    }
}
