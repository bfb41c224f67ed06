use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query has no FROM table")]
    MissingFrom,

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid relation: {0}")]
    InvalidRelation(String),

    #[error("Relation {relation} is missing required key column: {key}")]
    MissingRelationKey { relation: &'static str, key: &'static str },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },

    #[error("Execution error: {0}")]
    Execution(#[from] sqlx::Error),
}

impl QueryError {
    /// Whether the error was raised locally while building, before any database round-trip
    pub fn is_configuration(&self) -> bool {
        !matches!(self, QueryError::Execution(_))
    }
}
