//! Error types for the relquery crate
//!
//! This module contains all error types that can be returned by relquery operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelQueryError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Query error: {0}")]
    Query(#[from] query_core::QueryError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Unsupported platform for a pooled connection: {0}")]
    UnsupportedPlatform(String),
}
