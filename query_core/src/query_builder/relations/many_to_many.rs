use super::{check_related, distinct_values, AggregateRelation, Relation, RelationKind};
use crate::errors::QueryError;
use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::expression::Expression;
use serde_json::{json, Value};
use std::ops::{Deref, DerefMut};

/// Relation through a junction table
///
/// The junction's `local_key` points at the current table and is what gets
/// projected; `foreign_key` points at the far table.
#[derive(Debug, Clone)]
pub struct ManyToManyRelation {
    query: QueryBuilder,
    local_key: String,
    foreign_key: String,
}

impl ManyToManyRelation {
    pub fn new(
        parent: &QueryBuilder,
        junction_table: &str,
        local_key: &str,
        foreign_key: &str,
    ) -> Result<Self, QueryError> {
        check_related(
            parent,
            RelationKind::ManyToMany,
            junction_table,
            &[("local_key", local_key), ("foreign_key", foreign_key)],
        )?;

        let mut query = parent.new_query();
        query.set_from(junction_table).set_columns([local_key]);

        Ok(Self {
            query,
            local_key: local_key.to_string(),
            foreign_key: foreign_key.to_string(),
        })
    }

    pub fn local_key(&self) -> &str {
        &self.local_key
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }
}

impl Relation for ManyToManyRelation {
    fn kind(&self) -> RelationKind {
        RelationKind::ManyToMany
    }

    fn into_query(self: Box<Self>) -> QueryBuilder {
        self.query
    }
}

impl AggregateRelation for ManyToManyRelation {
    fn has(&mut self, count: u64) -> Result<(), QueryError> {
        let local_key = self.local_key.clone();
        self.query
            .set_columns([local_key.as_str()])
            .group_by([local_key])
            .having_expression(Expression::new("COUNT(*) >= ?", vec![json!(count)]));
        Ok(())
    }

    fn all(&mut self, values: Vec<Value>) -> Result<(), QueryError> {
        let values = distinct_values(values);
        let count = values.len();
        let matched = self
            .query
            .platform()
            .quote_identifier_chain(&self.query.qualify(&self.foreign_key));
        let local_key = self.local_key.clone();
        let foreign_key = self.foreign_key.clone();

        self.query
            .set_columns([local_key.as_str()])
            .where_in(&foreign_key, values)
            .group_by([local_key])
            .having_expression(Expression::new(
                format!("COUNT(DISTINCT {}) = ?", matched),
                vec![json!(count)],
            ));
        Ok(())
    }
}

impl Deref for ManyToManyRelation {
    type Target = QueryBuilder;

    fn deref(&self) -> &QueryBuilder {
        &self.query
    }
}

impl DerefMut for ManyToManyRelation {
    fn deref_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }
}
