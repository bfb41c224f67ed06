use serde_json::Value;

/// Raw SQL fragment embedded without qualification
///
/// Each `?` outside a quoted literal is replaced by the next bound value,
/// rendered with the platform's placeholder style.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    sql: String,
    params: Vec<Value>,
}

impl Expression {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Expression without bound values
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}
