//! Core relquery functionality
//!
//! This module contains the main RelQuery struct: it owns the connection, the
//! optional schema catalog and the default primary key, and hands out query
//! builders configured with them.

use query_core::platform::platform_by_name;
use query_core::{Connection, QueryBuilder, ResultSet, SchemaCatalog, Statement};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::connection::PgConnection;
use crate::errors::RelQueryError;
use config::{AppConfig, QueryConfig};

/// Entry point that builds queries against a single connection
#[derive(Debug, Clone)]
pub struct RelQuery {
    connection: Arc<dyn Connection>,
    pool: Option<PgPool>,
    catalog: Option<Arc<SchemaCatalog>>,
    primary_key: String,
}

impl RelQuery {
    /// Create a new RelQuery with a pooled Postgres connection
    pub async fn new(config: AppConfig) -> Result<Self, RelQueryError> {
        let platform = platform_by_name(&config.query.platform)
            .ok_or_else(|| RelQueryError::UnsupportedPlatform(config.query.platform.clone()))?;
        if platform.name() != "postgres" {
            return Err(RelQueryError::UnsupportedPlatform(
                config.query.platform.clone(),
            ));
        }

        let database = &config.database;
        let connection_string = database.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(database.max_connections)
            .min_connections(database.min_connections)
            .acquire_timeout(Duration::from_secs(database.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(database.idle_timeout_seconds));

        // Set max lifetime if specified
        if database.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(database.max_lifetime_seconds));
        }

        let pool = pool_options.connect(&connection_string).await?;
        tracing::info!(
            "Connected to {}:{}/{}",
            database.host,
            database.port,
            database.database
        );

        let mut relquery = Self::from_connection(
            Arc::new(PgConnection::new(pool.clone())),
            &config.query,
        );
        relquery.pool = Some(pool);
        Ok(relquery)
    }

    /// Wrap an existing connection, for other dialects or test doubles
    pub fn from_connection(connection: Arc<dyn Connection>, query: &QueryConfig) -> Self {
        let catalog = if query.has_catalog() {
            let catalog: SchemaCatalog = query
                .tables
                .iter()
                .map(|(table, columns)| (table.clone(), columns.clone()))
                .collect();
            Some(Arc::new(catalog))
        } else {
            None
        };

        Self {
            connection,
            pool: None,
            catalog,
            primary_key: query.primary_key.clone(),
        }
    }

    /// Get database pool reference, when connected through [`RelQuery::new`]
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn catalog(&self) -> Option<&SchemaCatalog> {
        self.catalog.as_deref()
    }

    /// Fresh builder without a FROM table
    pub fn query(&self) -> QueryBuilder {
        let query = QueryBuilder::new(Arc::clone(&self.connection))
            .with_primary_key(self.primary_key.clone());
        match &self.catalog {
            Some(catalog) => query.with_catalog(Arc::clone(catalog)),
            None => query,
        }
    }

    /// Fresh builder selecting from `table`
    pub fn table(&self, table: &str) -> QueryBuilder {
        let mut query = self.query();
        query.set_from(table);
        query
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), RelQueryError> {
        let statement = Statement::new("SELECT 1 AS ok".to_string(), Vec::new());
        let rows: ResultSet = self.connection.fetch_all(&statement).await?;
        if rows.is_empty() {
            tracing::warn!("Health check returned no rows");
        }
        Ok(())
    }
}
