//! Relation resolvers
//!
//! Each resolver owns a fresh builder targeting the related (or junction)
//! table and projecting a single key column, so the finished builder can sit
//! on the right-hand side of an `IN` predicate.

mod many_to_many;
mod many_to_one;
mod one_to_many;

pub use many_to_many::ManyToManyRelation;
pub use many_to_one::ManyToOneRelation;
pub use one_to_many::OneToManyRelation;

use crate::errors::QueryError;
use crate::query_builder::builder::QueryBuilder;
use serde_json::Value;
use std::ops::DerefMut;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::OneToMany => "one-to-many",
            RelationKind::ManyToOne => "many-to-one",
            RelationKind::ManyToMany => "many-to-many",
        }
    }
}

/// Key columns describing how the current table reaches the related table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKeys {
    /// The related table holds `foreign_key`, pointing back at the current FROM table
    OneToMany { foreign_key: String },
    /// The current column points at `primary_key` of the related table
    ManyToOne { primary_key: String },
    /// Junction table with `local_key` pointing at the current table and
    /// `foreign_key` pointing at the far table
    ManyToMany {
        local_key: String,
        foreign_key: String,
    },
}

impl RelationKeys {
    pub fn one_to_many(foreign_key: impl Into<String>) -> Self {
        RelationKeys::OneToMany {
            foreign_key: foreign_key.into(),
        }
    }

    pub fn many_to_one(primary_key: impl Into<String>) -> Self {
        RelationKeys::ManyToOne {
            primary_key: primary_key.into(),
        }
    }

    pub fn many_to_many(local_key: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        RelationKeys::ManyToMany {
            local_key: local_key.into(),
            foreign_key: foreign_key.into(),
        }
    }

    pub fn kind(&self) -> RelationKind {
        match self {
            RelationKeys::OneToMany { .. } => RelationKind::OneToMany,
            RelationKeys::ManyToOne { .. } => RelationKind::ManyToOne,
            RelationKeys::ManyToMany { .. } => RelationKind::ManyToMany,
        }
    }
}

/// A resolver configured through the builder it derefs to
pub trait Relation: DerefMut<Target = QueryBuilder> {
    fn kind(&self) -> RelationKind;

    /// The subquery, ready to be used as an `IN` operand
    fn into_query(self: Box<Self>) -> QueryBuilder;
}

/// Resolvers whose related rows can be grouped and counted per key
pub trait AggregateRelation: Relation {
    /// At least `count` related rows per key
    fn has(&mut self, count: u64) -> Result<(), QueryError>;

    /// Related to every one of `values`
    fn all(&mut self, values: Vec<Value>) -> Result<(), QueryError>;
}

/// Reject empty key names and, when a catalog is attached, unknown tables or columns
pub(crate) fn check_related(
    parent: &QueryBuilder,
    kind: RelationKind,
    table: &str,
    keys: &[(&'static str, &str)],
) -> Result<(), QueryError> {
    if table.trim().is_empty() {
        return Err(QueryError::MissingRelationKey {
            relation: kind.as_str(),
            key: "table",
        });
    }

    for (name, column) in keys {
        if column.trim().is_empty() {
            return Err(QueryError::MissingRelationKey {
                relation: kind.as_str(),
                key: *name,
            });
        }
    }

    if let Some(catalog) = parent.catalog() {
        catalog.ensure_table(table)?;
        for (_, column) in keys {
            catalog.ensure_column(table, column)?;
        }
    }
    Ok(())
}

/// Supplied values with duplicates removed, first occurrence wins
pub(crate) fn distinct_values(values: Vec<Value>) -> Vec<Value> {
    let mut distinct: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relation_keys_kind() {
        assert_eq!(RelationKeys::one_to_many("author_id").kind(), RelationKind::OneToMany);
        assert_eq!(RelationKeys::many_to_one("id").kind(), RelationKind::ManyToOne);
        assert_eq!(
            RelationKeys::many_to_many("post_id", "tag_id").kind(),
            RelationKind::ManyToMany
        );
        assert_eq!(RelationKind::ManyToMany.as_str(), "many-to-many");
    }

    #[test]
    fn test_distinct_values_keeps_first_occurrence() {
        let values = distinct_values(vec![json!(3), json!(1), json!(3), json!("1"), json!(1)]);
        assert_eq!(values, vec![json!(3), json!(1), json!("1")]);
    }
}
