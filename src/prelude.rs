//! Convenience re-exports for common relquery usage
//!
//! # Example
//!
//! ```rust
//! use relquery::prelude::*;
//!
//! // Builder, relation keys, config and connection types are now in scope
//! ```

// Core relquery components
pub use crate::connection::PgConnection;
pub use crate::core::RelQuery;
pub use crate::errors::RelQueryError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, QueryConfig};

// Query building
pub use query_core::prelude::*;

// Common external dependencies
pub use anyhow;
pub use sqlx;
pub use tokio;

pub use sqlx::PgPool;
