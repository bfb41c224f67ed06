//! SQL compilation
//!
//! Walks builder state into a single SELECT. Parameters are numbered across
//! the whole statement, subqueries and HAVING included, in textual order.

use crate::connection::Statement;
use crate::errors::QueryError;
use crate::platform::Platform;
use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::columns::{AggregateFunction, SelectColumn};
use crate::query_builder::condition::{Condition, Having, Operand};
use crate::query_builder::expression::Expression;
use crate::query_builder::join::{JoinClause, JoinCondition};
use crate::query_builder::operator::{Connector, Operator};
use serde_json::Value;

pub struct SqlGenerator<'a> {
    platform: &'a dyn Platform,
    params: Vec<Value>,
    inline: bool,
}

impl<'a> SqlGenerator<'a> {
    /// Generator binding values as placeholders
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self {
            platform,
            params: Vec::new(),
            inline: false,
        }
    }

    /// Generator rendering values as literals
    pub fn inline(platform: &'a dyn Platform) -> Self {
        Self {
            inline: true,
            ..Self::new(platform)
        }
    }

    pub fn compile(mut self, query: &QueryBuilder) -> Result<Statement, QueryError> {
        let sql = self.build_select(query)?;
        Ok(Statement::new(sql, self.params))
    }

    fn bind(&mut self, value: Value) -> String {
        if self.inline {
            self.platform.quote_value(&value)
        } else {
            self.params.push(value);
            self.platform.placeholder(self.params.len())
        }
    }

    fn identifier(&self, query: &QueryBuilder, column: &str) -> String {
        self.platform.quote_identifier_chain(&query.qualify(column))
    }

    /// Qualify against an explicit table reference instead of the FROM table
    fn identifier_for(&self, table: &str, column: &str) -> String {
        let separator = self.platform.identifier_separator();
        if column.contains(separator) {
            self.platform.quote_identifier_chain(column)
        } else {
            self.platform
                .quote_identifier_chain(&format!("{}{}{}", table, separator, column))
        }
    }

    fn build_select(&mut self, query: &QueryBuilder) -> Result<String, QueryError> {
        let from = query.get_from().ok_or(QueryError::MissingFrom)?;

        let mut parts = Vec::new();
        parts.push(format!("SELECT {}", self.build_select_clause(query, from)));
        parts.push(format!(
            "FROM {}",
            self.platform.quote_identifier_chain(from)
        ));

        let joins = self.build_join_clause(&query.joins);
        if !joins.is_empty() {
            parts.push(joins);
        }

        let where_clause = self.build_where_clause(query)?;
        if !where_clause.is_empty() {
            parts.push(format!("WHERE {}", where_clause));
        }

        let group_by = self.build_group_by_clause(query);
        if !group_by.is_empty() {
            parts.push(group_by);
        }

        let having = self.build_having_clause(query)?;
        if !having.is_empty() {
            parts.push(having);
        }

        let order = self.build_order_clause(query);
        if !order.is_empty() {
            parts.push(order);
        }

        let limit = Self::build_limit_clause(query.limit, query.offset);
        if !limit.is_empty() {
            parts.push(limit);
        }

        Ok(parts.join(" "))
    }

    // ========================================
    // SELECT list and JOIN
    // ========================================

    fn build_select_clause(&mut self, query: &QueryBuilder, from: &str) -> String {
        let mut fields: Vec<String> = Vec::new();

        for column in &query.columns {
            fields.push(self.build_select_field(from, column));
        }
        for join in &query.joins {
            for column in &join.columns {
                fields.push(self.build_select_field(join.table_ref(), column));
            }
        }

        if fields.is_empty() {
            "*".to_string()
        } else {
            fields.join(", ")
        }
    }

    fn build_select_field(&mut self, table: &str, field: &SelectColumn) -> String {
        match field {
            SelectColumn::All => self.identifier_for(table, "*"),
            SelectColumn::Column(column) => self.identifier_for(table, column),
            SelectColumn::ColumnAs { column, alias } => format!(
                "{} AS {}",
                self.identifier_for(table, column),
                self.platform.quote_identifier(alias)
            ),
            SelectColumn::Aggregate {
                function,
                column,
                alias,
            } => self.build_aggregate(table, *function, column.as_deref(), alias.as_deref()),
            SelectColumn::Expression(expression) => self.build_expression(expression),
        }
    }

    fn build_aggregate(
        &self,
        table: &str,
        function: AggregateFunction,
        column: Option<&str>,
        alias: Option<&str>,
    ) -> String {
        let argument = match column {
            Some(column) if function.is_distinct() => {
                format!("DISTINCT {}", self.identifier_for(table, column))
            }
            Some(column) => self.identifier_for(table, column),
            None => "*".to_string(),
        };
        let aggregate = format!("{}({})", function.to_sql(), argument);

        match alias {
            Some(alias) => format!("{} AS {}", aggregate, self.platform.quote_identifier(alias)),
            None => aggregate,
        }
    }

    fn build_join_clause(&self, joins: &[JoinClause]) -> String {
        joins
            .iter()
            .map(|join| {
                let table_part = match &join.alias {
                    Some(alias) => format!(
                        "{} AS {}",
                        self.platform.quote_identifier_chain(&join.table),
                        self.platform.quote_identifier(alias)
                    ),
                    None => self.platform.quote_identifier_chain(&join.table),
                };

                let condition_part = match &join.condition {
                    JoinCondition::On {
                        left_field,
                        right_field,
                    } => format!(
                        "{} = {}",
                        self.platform.quote_identifier_chain(left_field),
                        self.platform.quote_identifier_chain(right_field)
                    ),
                    JoinCondition::Expression(expression) => expression.clone(),
                };

                format!(
                    "{} {} ON {}",
                    join.join_type.to_sql(),
                    table_part,
                    condition_part
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ========================================
    // WHERE
    // ========================================

    fn build_where_clause(&mut self, query: &QueryBuilder) -> Result<String, QueryError> {
        let mut clause = String::new();

        for condition in &query.wheres {
            match condition {
                Condition::Basic {
                    column,
                    operator,
                    value,
                    negated,
                    connector,
                } => {
                    let expression =
                        self.build_condition(query, column, *operator, value, *negated)?;
                    Self::append(&mut clause, *connector, &expression);
                }
                Condition::Nested {
                    connector,
                    query: nested,
                } => {
                    let mut group = String::new();
                    self.build_group(query, nested, &mut group)?;
                    if !group.is_empty() {
                        Self::append(&mut clause, *connector, &format!("({})", group));
                    }
                }
            }
        }

        Ok(clause)
    }

    /// Only one level of grouping: a group found inside a group is spliced in
    /// without its parentheses. Predicates qualify against the outer query.
    fn build_group(
        &mut self,
        outer: &QueryBuilder,
        nested: &QueryBuilder,
        group: &mut String,
    ) -> Result<(), QueryError> {
        for condition in &nested.wheres {
            match condition {
                Condition::Basic {
                    column,
                    operator,
                    value,
                    negated,
                    connector,
                } => {
                    let expression =
                        self.build_condition(outer, column, *operator, value, *negated)?;
                    Self::append(group, *connector, &expression);
                }
                Condition::Nested { query: inner, .. } => {
                    self.build_group(outer, inner, group)?;
                }
            }
        }
        Ok(())
    }

    fn append(clause: &mut String, connector: Connector, expression: &str) {
        if !clause.is_empty() {
            clause.push(' ');
            clause.push_str(connector.to_sql());
            clause.push(' ');
        }
        clause.push_str(expression);
    }

    fn build_condition(
        &mut self,
        query: &QueryBuilder,
        column: &str,
        operator: Operator,
        value: &Operand,
        negated: bool,
    ) -> Result<String, QueryError> {
        let identifier = self.identifier(query, column);
        let (operator, wrap_not) = operator.negated(negated);

        let expression = match operator {
            Operator::In | Operator::NotIn => {
                self.build_in(&identifier, operator, value)?
            }
            Operator::Like | Operator::NotLike => {
                let pattern = Self::wildcard(value);
                let param = self.bind(pattern);
                format!("{} {} {}", identifier, operator.sql_symbol(), param)
            }
            Operator::Null | Operator::NotNull => {
                format!("{} {}", identifier, operator.sql_symbol())
            }
            Operator::Between | Operator::NotBetween => {
                let (low, high) = Self::bounds(value);
                let low = self.bind(low);
                let high = self.bind(high);
                format!(
                    "{} {} {} AND {}",
                    identifier,
                    operator.sql_symbol(),
                    low,
                    high
                )
            }
            _ => {
                let right = match value {
                    Operand::None => self.bind(Value::Null),
                    Operand::Value(value) => self.bind(value.clone()),
                    Operand::List(values) => self.bind(Value::Array(values.clone())),
                    Operand::Query(subquery) => format!("({})", self.build_select(subquery)?),
                };
                format!("{} {} {}", identifier, operator.sql_symbol(), right)
            }
        };

        if wrap_not {
            Ok(format!("NOT ({})", expression))
        } else {
            Ok(expression)
        }
    }

    fn build_in(
        &mut self,
        identifier: &str,
        operator: Operator,
        value: &Operand,
    ) -> Result<String, QueryError> {
        let values = match value {
            Operand::Query(subquery) => {
                let subquery = self.build_select(subquery)?;
                return Ok(format!(
                    "{} {} ({})",
                    identifier,
                    operator.sql_symbol(),
                    subquery
                ));
            }
            Operand::List(values) => values.clone(),
            Operand::Value(value) => vec![value.clone()],
            Operand::None => Vec::new(),
        };

        if values.is_empty() {
            // IN () is invalid SQL
            return Ok(match operator {
                Operator::NotIn => "1=1".to_string(),
                _ => "1=0".to_string(),
            });
        }

        let placeholders: Vec<String> = values.into_iter().map(|v| self.bind(v)).collect();
        Ok(format!(
            "{} {} ({})",
            identifier,
            operator.sql_symbol(),
            placeholders.join(", ")
        ))
    }

    /// `%value%`
    fn wildcard(value: &Operand) -> Value {
        let text = match value {
            Operand::Value(Value::String(s)) => s.clone(),
            Operand::Value(Value::Null) | Operand::None => String::new(),
            Operand::Value(other) => other.to_string(),
            Operand::List(values) => Value::Array(values.clone()).to_string(),
            Operand::Query(_) => String::new(),
        };
        Value::String(format!("%{}%", text))
    }

    /// First element is the low bound and the last remaining one the high
    /// bound, whatever their order. Missing bounds are NULL.
    fn bounds(value: &Operand) -> (Value, Value) {
        match value {
            Operand::List(values) => {
                let mut values = values.iter().cloned();
                let low = values.next().unwrap_or(Value::Null);
                let high = values.last().unwrap_or(Value::Null);
                (low, high)
            }
            Operand::Value(value) => (value.clone(), Value::Null),
            Operand::None | Operand::Query(_) => (Value::Null, Value::Null),
        }
    }

    fn build_expression(&mut self, expression: &Expression) -> String {
        let mut sql = String::with_capacity(expression.sql().len());
        let mut params = expression.params().iter();
        let mut in_literal = false;

        for ch in expression.sql().chars() {
            match ch {
                '\'' => {
                    in_literal = !in_literal;
                    sql.push(ch);
                }
                '?' if !in_literal => {
                    let value = params.next().cloned().unwrap_or(Value::Null);
                    let param = self.bind(value);
                    sql.push_str(&param);
                }
                _ => sql.push(ch),
            }
        }

        sql
    }

    // ========================================
    // GROUP BY, HAVING, ORDER BY, LIMIT
    // ========================================

    fn build_group_by_clause(&self, query: &QueryBuilder) -> String {
        if query.group_by.is_empty() {
            return String::new();
        }

        let columns: Vec<String> = query
            .group_by
            .iter()
            .map(|column| self.identifier(query, column))
            .collect();
        format!("GROUP BY {}", columns.join(", "))
    }

    fn build_having_clause(&mut self, query: &QueryBuilder) -> Result<String, QueryError> {
        if query.havings.is_empty() {
            return Ok(String::new());
        }

        let mut conditions = Vec::with_capacity(query.havings.len());
        for having in &query.havings {
            let condition = match having {
                Having::Condition {
                    column,
                    operator,
                    value,
                } => self.build_condition(query, column, *operator, value, false)?,
                Having::Expression(expression) => self.build_expression(expression),
            };
            conditions.push(condition);
        }

        Ok(format!("HAVING {}", conditions.join(" AND ")))
    }

    fn build_order_clause(&self, query: &QueryBuilder) -> String {
        if query.order.is_empty() {
            return String::new();
        }

        let order_items: Vec<String> = query
            .order
            .iter()
            .map(|(column, order)| format!("{} {}", self.identifier(query, column), order.to_sql()))
            .collect();
        format!("ORDER BY {}", order_items.join(", "))
    }

    /// OFFSET is only emitted alongside a non-zero LIMIT
    pub fn build_limit_clause(limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (Some(0), _) => "LIMIT 0".to_string(),
            (Some(limit), Some(offset)) => format!("LIMIT {} OFFSET {}", limit, offset),
            (Some(limit), None) => format!("LIMIT {}", limit),
            (None, _) => String::new(),
        }
    }
}
