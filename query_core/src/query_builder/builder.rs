//! Query builder
//!
//! Collects columns, joins, predicates, ordering, grouping and pagination
//! through a fluent `&mut self` API and compiles them into a single statement.

use crate::catalog::SchemaCatalog;
use crate::connection::{Connection, ResultSet, Statement};
use crate::errors::QueryError;
use crate::platform::Platform;
use crate::query_builder::columns::SelectColumn;
use crate::query_builder::condition::{Condition, Having, Operand};
use crate::query_builder::expression::Expression;
use crate::query_builder::join::{JoinClause, JoinCondition, JoinType};
use crate::query_builder::operator::{Connector, Operator};
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::relations::{
    AggregateRelation, ManyToManyRelation, ManyToOneRelation, OneToManyRelation, Relation,
    RelationKeys,
};
use crate::query_builder::sql_generation::SqlGenerator;
use crate::{debug_log, trace_log};
use serde_json::Value;
use std::sync::Arc;

const DEFAULT_PRIMARY_KEY: &str = "id";

/// Builder for a single SELECT statement
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    connection: Arc<dyn Connection>,
    catalog: Option<Arc<SchemaCatalog>>,
    primary_key: String,
    pub(crate) columns: Vec<SelectColumn>,
    pub(crate) from: Option<String>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) wheres: Vec<Condition>,
    pub(crate) order: Vec<(String, SortOrder)>,
    pub(crate) offset: Option<u64>,
    pub(crate) limit: Option<u64>,
    pub(crate) group_by: Vec<String>,
    pub(crate) havings: Vec<Having>,
}

impl QueryBuilder {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            catalog: None,
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            columns: vec![SelectColumn::All],
            from: None,
            joins: Vec::new(),
            wheres: Vec::new(),
            order: Vec::new(),
            offset: None,
            limit: None,
            group_by: Vec::new(),
            havings: Vec::new(),
        }
    }

    /// Attach a schema catalog used to validate relation tables and keys
    pub fn with_catalog(mut self, catalog: Arc<SchemaCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Primary key column assumed for related tables in one-to-many `all` checks
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Fresh builder sharing this builder's connection, catalog and key settings
    pub fn new_query(&self) -> QueryBuilder {
        let mut query = QueryBuilder::new(Arc::clone(&self.connection));
        query.catalog = self.catalog.clone();
        query.primary_key = self.primary_key.clone();
        query
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn platform(&self) -> &dyn Platform {
        self.connection.platform()
    }

    pub fn catalog(&self) -> Option<&SchemaCatalog> {
        self.catalog.as_deref()
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    // ========================================
    // Columns, FROM and JOIN
    // ========================================

    /// Replace the select list
    pub fn set_columns<I, C>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<SelectColumn>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn get_columns(&self) -> &[SelectColumn] {
        &self.columns
    }

    pub fn set_from(&mut self, table: impl Into<String>) -> &mut Self {
        self.from = Some(table.into());
        self
    }

    pub fn get_from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Append a join; `columns` are merged into the select list
    pub fn add_join<I, C>(
        &mut self,
        table: impl Into<String>,
        on: impl Into<JoinCondition>,
        columns: I,
        kind: JoinType,
    ) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<SelectColumn>,
    {
        let join = JoinClause::new(kind, table, on.into()).with_columns(columns);
        self.add_join_clause(join)
    }

    pub fn add_join_clause(&mut self, join: JoinClause) -> &mut Self {
        self.joins.push(join);
        self
    }

    pub fn get_joins(&self) -> &[JoinClause] {
        &self.joins
    }

    // ========================================
    // WHERE
    // ========================================

    /// Append a basic condition
    pub fn r#where(
        &mut self,
        column: &str,
        operator: Operator,
        value: impl Into<Operand>,
        negated: bool,
        connector: Connector,
    ) -> &mut Self {
        self.wheres.push(Condition::Basic {
            column: column.to_string(),
            operator,
            value: value.into(),
            negated,
            connector,
        });
        self
    }

    /// Append a basic condition using the operator's wire name
    pub fn where_op(
        &mut self,
        column: &str,
        operator: &str,
        value: impl Into<Operand>,
        negated: bool,
        connector: Connector,
    ) -> Result<&mut Self, QueryError> {
        let operator = operator.parse::<Operator>()?;
        Ok(self.r#where(column, operator, value, negated, connector))
    }

    /// Append a parenthesized group built by `callback` on a fresh builder.
    ///
    /// A group left empty by the callback is discarded.
    pub fn nest_where<F>(&mut self, callback: F, connector: Connector) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder),
    {
        let mut query = self.new_query();
        callback(&mut query);

        if !query.wheres.is_empty() {
            self.wheres.push(Condition::Nested {
                connector,
                query: Box::new(query),
            });
        }
        self
    }

    pub fn nest_or_where<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder),
    {
        self.nest_where(callback, Connector::Or)
    }

    /// Column is NULL or the empty string: `(col IS NULL OR col = '')`
    pub fn where_empty(&mut self, column: &str) -> &mut Self {
        self.nest_where(
            |query| {
                query.where_null(column);
                query.or_where_equal_to(column, "");
            },
            Connector::And,
        )
    }

    /// Column is neither NULL nor the empty string: `(col IS NOT NULL AND col != '')`
    pub fn where_not_empty(&mut self, column: &str) -> &mut Self {
        self.nest_where(
            |query| {
                query.where_not_null(column);
                query.where_not_equal_to(column, "");
            },
            Connector::And,
        )
    }

    pub fn where_in(&mut self, column: &str, values: impl Into<Operand>) -> &mut Self {
        self.r#where(column, Operator::In, values, false, Connector::And)
    }

    pub fn or_where_in(&mut self, column: &str, values: impl Into<Operand>) -> &mut Self {
        self.r#where(column, Operator::In, values, false, Connector::Or)
    }

    pub fn where_not_in(&mut self, column: &str, values: impl Into<Operand>) -> &mut Self {
        self.r#where(column, Operator::In, values, true, Connector::And)
    }

    /// BETWEEN the first and last of `values`, in the order given
    pub fn where_between(&mut self, column: &str, values: impl Into<Operand>) -> &mut Self {
        self.r#where(column, Operator::Between, values, false, Connector::And)
    }

    pub fn where_not_between(&mut self, column: &str, values: impl Into<Operand>) -> &mut Self {
        self.r#where(column, Operator::Between, values, true, Connector::And)
    }

    pub fn where_equal_to(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.r#where(column, Operator::Equal, Operand::Value(value.into()), false, Connector::And)
    }

    pub fn or_where_equal_to(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.r#where(column, Operator::Equal, Operand::Value(value.into()), false, Connector::Or)
    }

    pub fn where_not_equal_to(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.r#where(column, Operator::Equal, Operand::Value(value.into()), true, Connector::And)
    }

    pub fn where_less_than(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.r#where(column, Operator::LessThan, Operand::Value(value.into()), false, Connector::And)
    }

    pub fn where_less_than_or_equal(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.r#where(
            column,
            Operator::LessThanOrEqual,
            Operand::Value(value.into()),
            false,
            Connector::And,
        )
    }

    pub fn where_greater_than(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.r#where(column, Operator::GreaterThan, Operand::Value(value.into()), false, Connector::And)
    }

    pub fn where_greater_than_or_equal(
        &mut self,
        column: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.r#where(
            column,
            Operator::GreaterThanOrEqual,
            Operand::Value(value.into()),
            false,
            Connector::And,
        )
    }

    pub fn where_null(&mut self, column: &str) -> &mut Self {
        self.r#where(column, Operator::Null, Operand::None, false, Connector::And)
    }

    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.r#where(column, Operator::Null, Operand::None, true, Connector::And)
    }

    /// LIKE with the value wrapped in `%` on both sides at compile time
    pub fn where_like(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.r#where(column, Operator::Like, Operand::Value(value.into()), false, Connector::And)
    }

    pub fn or_where_like(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.r#where(column, Operator::Like, Operand::Value(value.into()), false, Connector::Or)
    }

    pub fn where_not_like(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.r#where(column, Operator::Like, Operand::Value(value.into()), true, Connector::And)
    }

    pub fn get_wheres(&self) -> &[Condition] {
        &self.wheres
    }

    // ========================================
    // Relational predicates
    // ========================================

    /// Keep rows whose `column` is related to every one of `values`.
    ///
    /// Accepts one-to-many keys (anchored on the current FROM table) and
    /// many-to-many junction keys.
    pub fn where_all<I, V>(
        &mut self,
        column: &str,
        related_table: &str,
        keys: RelationKeys,
        values: I,
    ) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut relation = self.aggregate_relation(column, related_table, keys)?;
        relation.all(values.into_iter().map(Into::into).collect())?;

        let query = relation.into_query();
        Ok(self.where_in(column, query))
    }

    /// Keep rows whose `column` has at least `min_count` related rows
    pub fn where_has(
        &mut self,
        column: &str,
        related_table: &str,
        keys: RelationKeys,
        min_count: u64,
    ) -> Result<&mut Self, QueryError> {
        let mut relation = self.aggregate_relation(column, related_table, keys)?;
        relation.has(min_count)?;

        let query = relation.into_query();
        Ok(self.where_in(column, query))
    }

    /// Filter by related rows configured through `configure`
    pub fn where_relational<F>(
        &mut self,
        column: &str,
        related_table: &str,
        keys: RelationKeys,
        configure: F,
        connector: Connector,
    ) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut dyn Relation),
    {
        let mut relation = self.relation(column, related_table, keys)?;
        configure(&mut *relation);

        let query = relation.into_query();
        Ok(self.r#where(column, Operator::In, query, false, connector))
    }

    pub fn or_where_relational<F>(
        &mut self,
        column: &str,
        related_table: &str,
        keys: RelationKeys,
        configure: F,
    ) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut dyn Relation),
    {
        self.where_relational(column, related_table, keys, configure, Connector::Or)
    }

    fn relation(
        &self,
        column: &str,
        related_table: &str,
        keys: RelationKeys,
    ) -> Result<Box<dyn Relation>, QueryError> {
        self.check_local_column(column, &keys)?;
        debug_log!(
            "[RELATION] {} {} -> {}",
            keys.kind().as_str(),
            column,
            related_table
        );

        let relation: Box<dyn Relation> = match keys {
            RelationKeys::OneToMany { foreign_key } => {
                Box::new(OneToManyRelation::new(self, related_table, &foreign_key)?)
            }
            RelationKeys::ManyToOne { primary_key } => {
                Box::new(ManyToOneRelation::new(self, related_table, &primary_key)?)
            }
            RelationKeys::ManyToMany {
                local_key,
                foreign_key,
            } => Box::new(ManyToManyRelation::new(
                self,
                related_table,
                &local_key,
                &foreign_key,
            )?),
        };
        Ok(relation)
    }

    fn aggregate_relation(
        &self,
        column: &str,
        related_table: &str,
        keys: RelationKeys,
    ) -> Result<Box<dyn AggregateRelation>, QueryError> {
        self.check_local_column(column, &keys)?;
        debug_log!(
            "[RELATION] {} {} -> {} (aggregate)",
            keys.kind().as_str(),
            column,
            related_table
        );

        match keys {
            RelationKeys::OneToMany { foreign_key } => Ok(Box::new(OneToManyRelation::new(
                self,
                related_table,
                &foreign_key,
            )?)),
            RelationKeys::ManyToMany {
                local_key,
                foreign_key,
            } => Ok(Box::new(ManyToManyRelation::new(
                self,
                related_table,
                &local_key,
                &foreign_key,
            )?)),
            RelationKeys::ManyToOne { .. } => Err(QueryError::InvalidRelation(format!(
                "many-to-one relation to {} cannot be counted; use where_relational",
                related_table
            ))),
        }
    }

    /// The filtered column of the current table must be named and, with a catalog, known
    fn check_local_column(&self, column: &str, keys: &RelationKeys) -> Result<(), QueryError> {
        if column.trim().is_empty() {
            return Err(QueryError::MissingRelationKey {
                relation: keys.kind().as_str(),
                key: "column",
            });
        }

        if let (Some(catalog), Some(_)) = (self.catalog(), self.get_from()) {
            let qualified = self.qualify(column);
            if let Some((table, name)) = qualified.rsplit_once(self.platform().identifier_separator())
            {
                catalog.ensure_column(table, name)?;
            }
        }
        Ok(())
    }

    // ========================================
    // ORDER BY, LIMIT, OFFSET
    // ========================================

    /// Order by `column`; ordering the same column again overwrites its direction
    pub fn order_by(&mut self, column: &str, direction: SortOrder) -> &mut Self {
        match self.order.iter_mut().find(|(existing, _)| existing == column) {
            Some(entry) => entry.1 = direction,
            None => self.order.push((column.to_string(), direction)),
        }
        self
    }

    pub fn get_order(&self) -> &[(String, SortOrder)] {
        &self.order
    }

    pub fn clear_order(&mut self) -> &mut Self {
        self.order.clear();
        self
    }

    /// Rows to skip, clamped at zero. Only emitted together with a limit.
    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset.max(0) as u64);
        self
    }

    /// Alias of [`QueryBuilder::offset`]
    pub fn skip(&mut self, offset: i64) -> &mut Self {
        self.offset(offset)
    }

    pub fn get_offset(&self) -> Option<u64> {
        self.offset
    }

    /// Maximum rows; a negative value clears the limit.
    ///
    /// `LIMIT 0` is kept: it returns no rows and still validates the query.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = if limit >= 0 { Some(limit as u64) } else { None };
        self
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    // ========================================
    // GROUP BY, HAVING
    // ========================================

    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn get_group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn having(
        &mut self,
        column: &str,
        operator: Operator,
        value: impl Into<Operand>,
    ) -> &mut Self {
        self.havings.push(Having::Condition {
            column: column.to_string(),
            operator,
            value: value.into(),
        });
        self
    }

    pub fn having_op(
        &mut self,
        column: &str,
        operator: &str,
        value: impl Into<Operand>,
    ) -> Result<&mut Self, QueryError> {
        let operator = operator.parse::<Operator>()?;
        Ok(self.having(column, operator, value))
    }

    pub fn having_expression(&mut self, expression: Expression) -> &mut Self {
        self.havings.push(Having::Expression(expression));
        self
    }

    pub fn get_havings(&self) -> &[Having] {
        &self.havings
    }

    // ========================================
    // Compilation and execution
    // ========================================

    /// Prefix `column` with the FROM table unless it is already qualified
    pub fn qualify(&self, column: &str) -> String {
        let separator = self.platform().identifier_separator();
        match &self.from {
            Some(table) if !column.contains(separator) => {
                format!("{}{}{}", table, separator, column)
            }
            _ => column.to_string(),
        }
    }

    /// Compile into SQL text and bound parameters
    pub fn compile(&self) -> Result<Statement, QueryError> {
        let statement = SqlGenerator::new(self.platform()).compile(self)?;
        trace_log!(
            "[COMPILE] {} ({} params)",
            statement.sql,
            statement.params.len()
        );
        Ok(statement)
    }

    /// SQL with every value inlined as a literal, for logging and debugging
    pub fn to_sql_string(&self) -> Result<String, QueryError> {
        SqlGenerator::inline(self.platform())
            .compile(self)
            .map(|statement| statement.sql)
    }

    /// Compile and run through the connection, returning raw rows
    pub async fn execute(&self) -> Result<ResultSet, QueryError> {
        let statement = self.compile()?;
        debug_log!("[EXECUTE] SQL: {}", statement.sql);

        let rows = self.connection.fetch_all(&statement).await?;
        debug_log!("[EXECUTE] {} rows", rows.len());
        Ok(rows)
    }
}
