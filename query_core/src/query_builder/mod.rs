//! Query builder utilities
//!
//! This module provides SQL query construction: the condition model, the
//! fluent builder, relation resolvers and the SQL compiler.

pub mod builder;
pub mod columns;
pub mod condition;
pub mod expression;
pub mod join;
pub mod operator;
pub mod ordering;
pub mod relations;
pub mod sql_generation;

#[cfg(test)]
pub(crate) mod test_support;


#[cfg(test)]
mod integration_tests;

pub use builder::QueryBuilder;
pub use columns::{AggregateFunction, SelectColumn};
pub use condition::{Condition, Having, Operand};
pub use expression::Expression;
pub use join::{JoinClause, JoinCondition, JoinType};
pub use operator::{Connector, Operator};
pub use ordering::SortOrder;
pub use relations::{
    AggregateRelation, ManyToManyRelation, ManyToOneRelation, OneToManyRelation, Relation,
    RelationKeys, RelationKind,
};
pub use sql_generation::SqlGenerator;
