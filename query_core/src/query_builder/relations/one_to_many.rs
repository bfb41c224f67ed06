use super::{check_related, distinct_values, AggregateRelation, Relation, RelationKind};
use crate::errors::QueryError;
use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::expression::Expression;
use serde_json::{json, Value};
use std::ops::{Deref, DerefMut};

/// The related table holds a foreign key back to the current FROM table
///
/// Projects the foreign key, e.g. users whose `id` appears as `posts.author_id`.
#[derive(Debug, Clone)]
pub struct OneToManyRelation {
    query: QueryBuilder,
    table: String,
    foreign_key: String,
}

impl OneToManyRelation {
    /// Build against `table`, anchored on the parent's FROM table
    pub fn new(parent: &QueryBuilder, table: &str, foreign_key: &str) -> Result<Self, QueryError> {
        parent.get_from().ok_or(QueryError::MissingFrom)?;
        check_related(
            parent,
            RelationKind::OneToMany,
            table,
            &[("foreign_key", foreign_key)],
        )?;

        let mut query = parent.new_query();
        query.set_from(table).set_columns([foreign_key]);

        Ok(Self {
            query,
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
        })
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }
}

impl Relation for OneToManyRelation {
    fn kind(&self) -> RelationKind {
        RelationKind::OneToMany
    }

    fn into_query(self: Box<Self>) -> QueryBuilder {
        self.query
    }
}

impl AggregateRelation for OneToManyRelation {
    fn has(&mut self, count: u64) -> Result<(), QueryError> {
        let foreign_key = self.foreign_key.clone();
        self.query
            .set_columns([foreign_key.as_str()])
            .group_by([foreign_key])
            .having_expression(Expression::new("COUNT(*) >= ?", vec![json!(count)]));
        Ok(())
    }

    /// Every value must match the related table's primary key within one group
    fn all(&mut self, values: Vec<Value>) -> Result<(), QueryError> {
        let primary_key = self.query.primary_key().to_string();
        check_related(
            &self.query,
            RelationKind::OneToMany,
            &self.table,
            &[("primary_key", primary_key.as_str())],
        )?;

        let values = distinct_values(values);
        let count = values.len();
        let matched = self
            .query
            .platform()
            .quote_identifier_chain(&self.query.qualify(&primary_key));
        let foreign_key = self.foreign_key.clone();

        self.query
            .set_columns([foreign_key.as_str()])
            .where_in(&primary_key, values)
            .group_by([foreign_key])
            .having_expression(Expression::new(
                format!("COUNT(DISTINCT {}) = ?", matched),
                vec![json!(count)],
            ));
        Ok(())
    }
}

impl Deref for OneToManyRelation {
    type Target = QueryBuilder;

    fn deref(&self) -> &QueryBuilder {
        &self.query
    }
}

impl DerefMut for OneToManyRelation {
    fn deref_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }
}
