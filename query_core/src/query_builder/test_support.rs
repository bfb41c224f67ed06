//! In-memory connection used by the builder tests

use crate::connection::{Connection, ResultSet, Row, Statement};
use crate::platform::{MySqlPlatform, Platform, PostgresPlatform};
use crate::query_builder::builder::QueryBuilder;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Records every statement it is asked to run and answers with canned rows
#[derive(Debug)]
pub(crate) struct RecordingConnection {
    platform: Box<dyn Platform>,
    rows: Vec<Row>,
    fail: bool,
    executed: Mutex<Vec<Statement>>,
}

impl RecordingConnection {
    pub(crate) fn new(platform: Box<dyn Platform>) -> Self {
        Self {
            platform,
            rows: Vec::new(),
            fail: false,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn postgres() -> Arc<Self> {
        Arc::new(Self::new(Box::new(PostgresPlatform)))
    }

    pub(crate) fn mysql() -> Arc<Self> {
        Arc::new(Self::new(Box::new(MySqlPlatform)))
    }

    pub(crate) fn postgres_with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::new(Box::new(PostgresPlatform))
        }
    }

    pub(crate) fn postgres_failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Box::new(PostgresPlatform))
        }
    }

    pub(crate) fn executed(&self) -> Vec<Statement> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    async fn fetch_all(&self, statement: &Statement) -> Result<ResultSet, sqlx::Error> {
        self.executed.lock().unwrap().push(statement.clone());
        if self.fail {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(ResultSet::new(self.rows.clone()))
    }
}

/// Postgres builder selecting from `table`
pub(crate) fn pg_query(table: &str) -> QueryBuilder {
    let mut query = QueryBuilder::new(RecordingConnection::postgres());
    query.set_from(table);
    query
}
