use super::{check_related, Relation, RelationKind};
use crate::errors::QueryError;
use crate::query_builder::builder::QueryBuilder;
use std::ops::{Deref, DerefMut};

/// The current table holds a foreign key into the related table
///
/// No grouping: the related table is filtered directly and its key projected.
#[derive(Debug, Clone)]
pub struct ManyToOneRelation {
    query: QueryBuilder,
    primary_key: String,
}

impl ManyToOneRelation {
    pub fn new(parent: &QueryBuilder, table: &str, primary_key: &str) -> Result<Self, QueryError> {
        check_related(
            parent,
            RelationKind::ManyToOne,
            table,
            &[("primary_key", primary_key)],
        )?;

        let mut query = parent.new_query();
        query.set_from(table).set_columns([primary_key]);

        Ok(Self {
            query,
            primary_key: primary_key.to_string(),
        })
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }
}

impl Relation for ManyToOneRelation {
    fn kind(&self) -> RelationKind {
        RelationKind::ManyToOne
    }

    fn into_query(self: Box<Self>) -> QueryBuilder {
        self.query
    }
}

impl Deref for ManyToOneRelation {
    type Target = QueryBuilder;

    fn deref(&self) -> &QueryBuilder {
        &self.query
    }
}

impl DerefMut for ManyToOneRelation {
    fn deref_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }
}
