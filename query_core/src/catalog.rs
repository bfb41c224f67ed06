//! Locally known schema
//!
//! The catalog lets relation resolvers reject unknown tables and key columns
//! while the query is still being built, without asking the database.

use crate::errors::QueryError;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    tables: BTreeMap<String, BTreeSet<String>>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with its columns, replacing any earlier registration
    pub fn with_table<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_table(table, columns);
        self
    }

    pub fn add_table<I, S>(&mut self, table: impl Into<String>, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(table.into(), columns.into_iter().map(Into::into).collect());
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .map(|columns| columns.contains(column))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn ensure_table(&self, table: &str) -> Result<(), QueryError> {
        if self.has_table(table) {
            Ok(())
        } else {
            Err(QueryError::TableNotFound(table.to_string()))
        }
    }

    pub fn ensure_column(&self, table: &str, column: &str) -> Result<(), QueryError> {
        self.ensure_table(table)?;
        if self.has_column(table, column) {
            Ok(())
        } else {
            Err(QueryError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
            })
        }
    }
}

impl<C> FromIterator<(String, C)> for SchemaCatalog
where
    C: IntoIterator,
    C::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (String, C)>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for (table, columns) in iter {
            catalog.add_table(table, columns);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog = SchemaCatalog::new().with_table("posts", ["id", "author_id"]);

        assert!(catalog.has_table("posts"));
        assert!(!catalog.has_table("comments"));
        assert!(catalog.has_column("posts", "author_id"));
        assert!(!catalog.has_column("posts", "title"));
    }

    #[test]
    fn test_catalog_ensure_errors() {
        let catalog = SchemaCatalog::new().with_table("posts", ["id"]);

        assert!(matches!(
            catalog.ensure_table("tags"),
            Err(QueryError::TableNotFound(t)) if t == "tags"
        ));
        assert!(matches!(
            catalog.ensure_column("posts", "author_id"),
            Err(QueryError::ColumnNotFound { .. })
        ));
        assert!(catalog.ensure_column("posts", "id").is_ok());
    }

    #[test]
    fn test_catalog_from_iter() {
        let catalog: SchemaCatalog = vec![
            ("users".to_string(), vec!["id".to_string()]),
            ("tags".to_string(), vec!["id".to_string(), "name".to_string()]),
        ]
        .into_iter()
        .collect();

        assert!(catalog.has_column("tags", "name"));
        assert!(!catalog.is_empty());
    }
}
