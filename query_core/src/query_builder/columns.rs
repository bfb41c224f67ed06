use crate::query_builder::expression::Expression;

/// SQL aggregate functions usable in a select list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// COUNT(*) or COUNT(column)
    Count,
    /// COUNT(DISTINCT column)
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            AggregateFunction::Count | AggregateFunction::CountDistinct => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }

    pub fn is_distinct(&self) -> bool {
        matches!(self, AggregateFunction::CountDistinct)
    }
}

/// One entry of a select list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumn {
    /// Wildcard for the owning table
    All,
    Column(String),
    ColumnAs {
        column: String,
        alias: String,
    },
    Aggregate {
        function: AggregateFunction,
        column: Option<String>, // None for COUNT(*)
        alias: Option<String>,
    },
    /// Embedded without qualification
    Expression(Expression),
}

impl SelectColumn {
    pub fn column(column: impl Into<String>) -> Self {
        SelectColumn::Column(column.into())
    }

    pub fn column_as(column: impl Into<String>, alias: impl Into<String>) -> Self {
        SelectColumn::ColumnAs {
            column: column.into(),
            alias: alias.into(),
        }
    }

    pub fn count_all() -> Self {
        SelectColumn::Aggregate {
            function: AggregateFunction::Count,
            column: None,
            alias: None,
        }
    }

    pub fn aggregate(function: AggregateFunction, column: impl Into<String>) -> Self {
        SelectColumn::Aggregate {
            function,
            column: Some(column.into()),
            alias: None,
        }
    }

    pub fn count(column: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Count, column)
    }

    pub fn count_distinct(column: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::CountDistinct, column)
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Sum, column)
    }

    pub fn avg(column: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Avg, column)
    }

    pub fn min(column: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Min, column)
    }

    pub fn max(column: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Max, column)
    }

    /// Attach an alias to an aggregate; other variants are returned unchanged
    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        match self {
            SelectColumn::Aggregate {
                function, column, ..
            } => SelectColumn::Aggregate {
                function,
                column,
                alias: Some(alias.into()),
            },
            SelectColumn::Column(column) => SelectColumn::ColumnAs {
                column,
                alias: alias.into(),
            },
            other => other,
        }
    }
}

impl From<&str> for SelectColumn {
    fn from(column: &str) -> Self {
        if column == "*" {
            SelectColumn::All
        } else {
            SelectColumn::Column(column.to_string())
        }
    }
}

impl From<String> for SelectColumn {
    fn from(column: String) -> Self {
        SelectColumn::from(column.as_str())
    }
}

impl From<Expression> for SelectColumn {
    fn from(expression: Expression) -> Self {
        SelectColumn::Expression(expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_function_to_sql() {
        assert_eq!(AggregateFunction::Count.to_sql(), "COUNT");
        assert_eq!(AggregateFunction::CountDistinct.to_sql(), "COUNT");
        assert_eq!(AggregateFunction::Sum.to_sql(), "SUM");
        assert_eq!(AggregateFunction::Avg.to_sql(), "AVG");
        assert_eq!(AggregateFunction::Min.to_sql(), "MIN");
        assert_eq!(AggregateFunction::Max.to_sql(), "MAX");
        assert!(AggregateFunction::CountDistinct.is_distinct());
        assert!(!AggregateFunction::Count.is_distinct());
    }

    #[test]
    fn test_wildcard_from_str() {
        assert_eq!(SelectColumn::from("*"), SelectColumn::All);
        assert_eq!(SelectColumn::from("name"), SelectColumn::Column("name".to_string()));
    }

    #[test]
    fn test_with_alias() {
        assert_eq!(
            SelectColumn::count_all().with_alias("total"),
            SelectColumn::Aggregate {
                function: AggregateFunction::Count,
                column: None,
                alias: Some("total".to_string()),
            }
        );
        assert_eq!(
            SelectColumn::column("name").with_alias("n"),
            SelectColumn::column_as("name", "n")
        );
        assert_eq!(SelectColumn::All.with_alias("x"), SelectColumn::All);
    }
}
