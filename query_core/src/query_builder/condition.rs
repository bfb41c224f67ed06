//! Condition model
//!
//! A condition is either a single predicate against a column or a nested group
//! whose predicates come from a child builder.

use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::expression::Expression;
use crate::query_builder::operator::{Connector, Operator};
use serde_json::Value;

/// Right-hand side of a predicate
#[derive(Debug, Clone)]
pub enum Operand {
    /// No value (null tests)
    None,
    Value(Value),
    List(Vec<Value>),
    /// Subquery, rendered in place as `(SELECT ...)`
    Query(Box<QueryBuilder>),
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => Operand::List(values),
            other => Operand::Value(other),
        }
    }
}

impl<V: Into<Value>> From<Vec<V>> for Operand {
    fn from(values: Vec<V>) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>, const N: usize> From<[V; N]> for Operand {
    fn from(values: [V; N]) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<QueryBuilder> for Operand {
    fn from(query: QueryBuilder) -> Self {
        Operand::Query(Box::new(query))
    }
}

/// Single entry of a WHERE list
#[derive(Debug, Clone)]
pub enum Condition {
    Basic {
        column: String,
        operator: Operator,
        value: Operand,
        negated: bool,
        connector: Connector,
    },
    Nested {
        connector: Connector,
        query: Box<QueryBuilder>,
    },
}

impl Condition {
    pub fn connector(&self) -> Connector {
        match self {
            Condition::Basic { connector, .. } | Condition::Nested { connector, .. } => *connector,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Condition::Nested { .. })
    }
}

/// Single entry of a HAVING list
#[derive(Debug, Clone)]
pub enum Having {
    Condition {
        column: String,
        operator: Operator,
        value: Operand,
    },
    /// Embedded as-is
    Expression(Expression),
}
