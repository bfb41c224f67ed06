//! # relquery
//!
//! A relational SQL SELECT builder. Filters on related tables (one-to-many,
//! many-to-one and many-to-many) compile into `IN` subqueries, so a single
//! statement answers "users with at least three posts" or "posts tagged with
//! every one of these tags".
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relquery::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let relquery = RelQuery::new(config).await?;
//!
//!     let mut authors = relquery.table("users");
//!     authors
//!         .set_columns(["id", "email"])
//!         .where_equal_to("status", "active")
//!         .where_has("id", "posts", RelationKeys::one_to_many("author_id"), 3)?
//!         .order_by("email", SortOrder::Asc)
//!         .limit(20);
//!
//!     println!("{}", authors.to_sql_string()?);
//!     for row in authors.execute().await? {
//!         println!("{:?}", row);
//!     }
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub mod connection;
pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::connection::PgConnection;
pub use crate::core::RelQuery;
pub use crate::errors::RelQueryError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, QueryConfig};

// Re-export the query crate
pub use query_core;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
