//! Convenience re-exports for common query-core usage

pub use crate::catalog::SchemaCatalog;
pub use crate::connection::{Connection, ResultSet, Row, Statement};
pub use crate::errors::QueryError;
pub use crate::platform::{MySqlPlatform, Platform, PostgresPlatform, SqlitePlatform};
pub use crate::query_builder::{
    AggregateFunction, Condition, Connector, Expression, Having, JoinClause, JoinCondition,
    JoinType, Operand, Operator, QueryBuilder, Relation, RelationKeys, SelectColumn, SortOrder,
};

pub use async_trait::async_trait;
pub use serde_json::{json, Value};
