//! # Configuration Management for relquery
//!
//! This crate provides the configuration structures shared by relquery
//! components: the database pool settings and the query compiler settings.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{DatabaseConfig, QueryConfig};
//!
//! let db_config = DatabaseConfig::new(
//!     "localhost".to_string(), 5432, "myapp".to_string(),
//!     "postgres".to_string(), "password".to_string(),
//!     1, 10, 30, 600, 3600,
//! );
//!
//! let query_config = QueryConfig::new("postgres".to_string(), "id".to_string());
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [database]
//! host = "localhost"
//! port = 5432
//! database = "myapp"
//! username = "postgres"
//! password = "password"
//! min_connections = 1
//! max_connections = 10
//! connection_timeout_seconds = 30
//! idle_timeout_seconds = 600
//! max_lifetime_seconds = 3600
//!
//! [query]
//! platform = "postgres"
//! primary_key = "id"
//!
//! [query.tables]
//! users = ["id", "email", "status"]
//! posts = ["id", "author_id", "published"]
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from relquery.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./relquery.toml";
const CONFIG_PATH_VAR: &str = "RELQUERY_CONFIG";
const SUPPORTED_PLATFORMS: &[&str] = &["postgres", "postgresql", "pg", "mysql", "mariadb", "sqlite"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
}

/// Query compiler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// SQL dialect: postgres, mysql or sqlite
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Primary key assumed for related tables
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Known tables and their columns; when present, relation keys are checked against it
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<String>>,
}

fn default_platform() -> String {
    "postgres".to_string()
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            primary_key: default_primary_key(),
            tables: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = {
            // A missing .env file is fine; the variable may already be set
            match dotenvy::dotenv() {
                Ok(_) => {}
                Err(err) if err.not_found() => {}
                Err(err) => return Err(err.into()),
            }

            if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
                Self::from_file(&config_path)
            } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
                Self::from_file(DEFAULT_CONFIG_PATH)
            } else {
                Err(ConfigError::Invalid(format!(
                    "Config path must be specified in .env file as {} or in {} file",
                    CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
                )))
            }
        }?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        // Database validations
        if self.database.host.is_empty() {
            return Err(ConfigError::Invalid(
                "Database host cannot be empty".to_string(),
            ));
        }
        if self.database.port == 0 {
            return Err(ConfigError::Invalid(
                "Database port cannot be zero".to_string(),
            ));
        }
        if self.database.database.is_empty() {
            return Err(ConfigError::Invalid(
                "Database name cannot be empty".to_string(),
            ));
        }
        if self.database.username.is_empty() {
            return Err(ConfigError::Invalid(
                "Database username cannot be empty".to_string(),
            ));
        }
        if self.database.min_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database min_connections must be greater than 0".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(
                "Database min_connections cannot be greater than max_connections".to_string(),
            ));
        }
        if self.database.connection_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Database connection_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        self.query.validate()
    }
}

impl QueryConfig {
    /// Create a query configuration without a table catalog
    pub fn new(platform: String, primary_key: String) -> Self {
        Self {
            platform,
            primary_key,
            tables: BTreeMap::new(),
        }
    }

    /// Register a table and its columns for relation key checks
    pub fn with_table(mut self, table: impl Into<String>, columns: Vec<String>) -> Self {
        self.tables.insert(table.into(), columns);
        self
    }

    /// Whether relation keys should be checked against configured tables
    pub fn has_catalog(&self) -> bool {
        !self.tables.is_empty()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let platform = self.platform.to_ascii_lowercase();
        if !SUPPORTED_PLATFORMS.contains(&platform.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Unsupported query platform: {}",
                self.platform
            )));
        }
        if self.primary_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Query primary_key cannot be empty".to_string(),
            ));
        }
        for (table, columns) in &self.tables {
            if table.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "Query table names cannot be empty".to_string(),
                ));
            }
            if columns.iter().any(|column| column.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "Table {} has an empty column name",
                    table
                )));
            }
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Create a new database configuration
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: String,
        port: u16,
        database: String,
        username: String,
        password: String,
        min_connections: u32,
        max_connections: u32,
        connection_timeout_seconds: u64,
        idle_timeout_seconds: u64,
        max_lifetime_seconds: u64,
    ) -> Self {
        Self {
            host,
            port,
            database,
            username,
            password,
            min_connections,
            max_connections,
            connection_timeout_seconds,
            idle_timeout_seconds,
            max_lifetime_seconds,
        }
    }

    /// Build connection string
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}
