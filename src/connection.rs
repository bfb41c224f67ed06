//! PostgreSQL connection backed by a sqlx pool
//!
//! Each compiled statement is wrapped so that Postgres returns every row as a
//! single JSONB object, which maps directly onto a raw result row.

use async_trait::async_trait;
use query_core::{Connection, PostgresPlatform, ResultSet, Statement};
use query_core::platform::Platform;
use serde_json::Value;
use sqlx::PgPool;

use crate::debug_log;

/// How a string parameter is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringBind {
    Text,
    Timestamp,
    Uuid,
}

impl StringBind {
    /// Strings stay text unless typed binding is enabled
    fn classify(value: &str, typed: bool) -> Self {
        if !typed {
            StringBind::Text
        } else if chrono::DateTime::parse_from_rfc3339(value).is_ok() {
            StringBind::Timestamp
        } else if uuid::Uuid::parse_str(value).is_ok() {
            StringBind::Uuid
        } else {
            StringBind::Text
        }
    }
}

/// Bind a JSON value with the closest native Postgres type
macro_rules! bind_json_param {
    ($query:expr, $param:expr, $typed:expr) => {
        match $param {
            Value::String(s) => match StringBind::classify(&s, $typed) {
                StringBind::Timestamp => match chrono::DateTime::parse_from_rfc3339(&s) {
                    Ok(dt) => $query.bind(dt.with_timezone(&chrono::Utc)),
                    Err(_) => $query.bind(s),
                },
                StringBind::Uuid => match uuid::Uuid::parse_str(&s) {
                    Ok(uuid) => $query.bind(uuid),
                    Err(_) => $query.bind(s),
                },
                StringBind::Text => $query.bind(s),
            },
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                        $query.bind(i as i32)
                    } else {
                        $query.bind(i)
                    }
                } else if let Some(f) = n.as_f64() {
                    $query.bind(f)
                } else {
                    $query.bind(n.to_string())
                }
            }
            Value::Bool(b) => $query.bind(b),
            Value::Null => $query.bind(Option::<String>::None),
            other => $query.bind(sqlx::types::Json(other)),
        }
    };
}

/// [`Connection`] running statements on a Postgres pool
#[derive(Debug, Clone)]
pub struct PgConnection {
    pool: PgPool,
    platform: PostgresPlatform,
    typed_strings: bool,
}

impl PgConnection {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            platform: PostgresPlatform,
            typed_strings: false,
        }
    }

    /// Bind RFC3339 strings as `timestamptz` and UUID strings as `uuid`
    ///
    /// Off by default. With it on, comparing such a string against a text
    /// column fails in Postgres.
    pub fn with_typed_strings(mut self, typed: bool) -> Self {
        self.typed_strings = typed;
        self
    }

    pub fn typed_strings(&self) -> bool {
        self.typed_strings
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Statement text that yields one JSONB object per row
    pub fn row_json_sql(sql: &str) -> String {
        format!("SELECT to_jsonb(q) FROM ({}) AS q", sql)
    }
}

#[async_trait]
impl Connection for PgConnection {
    fn platform(&self) -> &dyn Platform {
        &self.platform
    }

    async fn fetch_all(&self, statement: &Statement) -> Result<ResultSet, sqlx::Error> {
        let sql = Self::row_json_sql(&statement.sql);
        debug_log!("[PG] {} ({} params)", sql, statement.params.len());

        let mut query = sqlx::query_scalar::<_, Value>(&sql);
        for param in statement.params.iter().cloned() {
            query = bind_json_param!(query, param, self.typed_strings);
        }

        let values = query.fetch_all(&self.pool).await.map_err(|err| {
            tracing::warn!("Query failed: {} ({})", statement.sql, err);
            err
        })?;

        let rows = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect();
        Ok(ResultSet::new(rows))
    }
}
