//! Execution seam between the query builder and a live database
//!
//! The builder never performs I/O itself; it hands a compiled [`Statement`] to a
//! [`Connection`] and returns whatever rows come back.

use crate::platform::Platform;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Debug};

/// A compiled SELECT statement and its bound parameters, in placeholder order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// A raw result row keyed by column name
pub type Row = Map<String, Value>;

/// Rows returned by a connection, unhydrated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Executes compiled statements against a database
///
/// Failures are returned unchanged; retries, timeouts and pooling belong to the
/// implementation, not to the builder.
#[async_trait]
pub trait Connection: Send + Sync + Debug {
    /// Dialect rules the compiler must follow for this connection
    fn platform(&self) -> &dyn Platform;

    /// Run a statement and collect every row
    async fn fetch_all(&self, statement: &Statement) -> Result<ResultSet, sqlx::Error>;
}
