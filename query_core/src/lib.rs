//! Query Core - relational query construction for relquery
//!
//! This crate provides the condition model, the fluent query builder, relation
//! resolvers that compile related-table filters into subqueries, and the SQL
//! compiler. Execution is delegated to a [`Connection`] supplied by the caller.

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

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod catalog;
pub mod connection;
pub mod errors;
pub mod platform;
pub mod prelude;
pub mod query_builder;

pub use catalog::SchemaCatalog;
pub use connection::{Connection, ResultSet, Row, Statement};
pub use errors::QueryError;
pub use platform::{MySqlPlatform, Platform, PostgresPlatform, SqlitePlatform};
pub use query_builder::{
    Condition, Connector, Operand, Operator, QueryBuilder, RelationKeys, SortOrder,
};
