use crate::query_builder::columns::SelectColumn;

/// Represents the type of SQL JOIN operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// INNER JOIN - rows with matching values in both tables
    #[default]
    Inner,
    /// LEFT JOIN - every row of the left table, matched rows of the right
    Left,
    /// RIGHT JOIN - every row of the right table, matched rows of the left
    Right,
    /// FULL OUTER JOIN - rows with a match in either table
    Outer,
}

impl JoinType {
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Outer => "FULL OUTER JOIN",
        }
    }
}

/// Represents a condition for joining tables
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// ON left = right, both sides quoted as identifiers
    On {
        left_field: String,
        right_field: String,
    },
    /// Raw ON expression, embedded as-is
    Expression(String),
}

impl JoinCondition {
    pub fn on(left_field: impl Into<String>, right_field: impl Into<String>) -> Self {
        JoinCondition::On {
            left_field: left_field.into(),
            right_field: right_field.into(),
        }
    }
}

impl From<&str> for JoinCondition {
    fn from(expression: &str) -> Self {
        JoinCondition::Expression(expression.to_string())
    }
}

/// Represents a complete JOIN clause
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: String,
    pub alias: Option<String>,
    pub condition: JoinCondition,
    /// Columns of the joined table merged into the select list
    pub columns: Vec<SelectColumn>,
}

impl JoinClause {
    /// Create a JOIN that selects every column of the joined table
    pub fn new(join_type: JoinType, table: impl Into<String>, condition: JoinCondition) -> Self {
        Self {
            join_type,
            table: table.into(),
            alias: None,
            condition,
            columns: vec![SelectColumn::All],
        }
    }

    /// Create a JOIN clause with an ON column pair
    pub fn new_on(
        join_type: JoinType,
        table: impl Into<String>,
        left_field: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        Self::new(join_type, table, JoinCondition::on(left_field, right_field))
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<SelectColumn>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Get the table reference (alias if present, otherwise table name)
    pub fn table_ref(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_type_to_sql() {
        assert_eq!(JoinType::Inner.to_sql(), "INNER JOIN");
        assert_eq!(JoinType::Left.to_sql(), "LEFT JOIN");
        assert_eq!(JoinType::Right.to_sql(), "RIGHT JOIN");
        assert_eq!(JoinType::Outer.to_sql(), "FULL OUTER JOIN");
    }

    #[test]
    fn test_join_clause_new_on() {
        let join = JoinClause::new_on(JoinType::Inner, "orders", "users.id", "orders.user_id");

        assert_eq!(join.join_type, JoinType::Inner);
        assert_eq!(join.table, "orders");
        assert_eq!(join.alias, None);
        assert_eq!(join.columns, vec![SelectColumn::All]);
        assert_eq!(
            join.condition,
            JoinCondition::On {
                left_field: "users.id".to_string(),
                right_field: "orders.user_id".to_string(),
            }
        );
    }

    #[test]
    fn test_join_clause_alias_and_columns() {
        let join = JoinClause::new(JoinType::Left, "orders", "o.user_id = users.id".into())
            .with_alias("o")
            .with_columns(["total"]);

        assert_eq!(join.table_ref(), "o");
        assert_eq!(join.columns, vec![SelectColumn::Column("total".to_string())]);
        assert_eq!(
            join.condition,
            JoinCondition::Expression("o.user_id = users.id".to_string())
        );
    }

    #[test]
    fn test_join_clause_table_ref_without_alias() {
        let join = JoinClause::new_on(JoinType::Inner, "orders", "users.id", "orders.user_id");
        assert_eq!(join.table_ref(), "orders");
    }
}
