//! SQL dialect rules
//!
//! A [`Platform`] knows how the target database quotes identifiers, separates
//! qualified names and spells bound-parameter placeholders.

use serde_json::Value;
use std::fmt::Debug;

/// Dialect-specific identifier and placeholder rules
pub trait Platform: Send + Sync + Debug {
    /// Dialect name used in logs and configuration
    fn name(&self) -> &'static str;

    /// Character sequence separating a table qualifier from a column
    fn identifier_separator(&self) -> &'static str {
        "."
    }

    /// Quote character wrapped around every identifier part
    fn identifier_quote(&self) -> char;

    /// Placeholder for the parameter at `index` (1-based)
    fn placeholder(&self, index: usize) -> String;

    /// Quote a single identifier part, doubling embedded quote characters
    fn quote_identifier(&self, identifier: &str) -> String {
        let quote = self.identifier_quote();
        let escaped = identifier.replace(quote, &format!("{}{}", quote, quote));
        format!("{}{}{}", quote, escaped, quote)
    }

    /// Quote every part of a possibly qualified identifier, leaving the wildcard bare
    fn quote_identifier_chain(&self, identifier: &str) -> String {
        let separator = self.identifier_separator();
        identifier
            .split(separator)
            .map(|part| {
                if part == "*" {
                    part.to_string()
                } else {
                    self.quote_identifier(part)
                }
            })
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Render a value as an inline SQL literal
    fn quote_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
            other => format!("'{}'", other.to_string().replace('\'', "''")),
        }
    }
}

/// PostgreSQL: double-quoted identifiers, `$n` placeholders
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresPlatform;

impl Platform for PostgresPlatform {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }
}

/// MySQL: backtick identifiers, positional `?` placeholders
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlPlatform;

impl Platform for MySqlPlatform {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn quote_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''")),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => "0".to_string(),
            Value::Null => "NULL".to_string(),
            Value::Number(n) => n.to_string(),
            other => format!("'{}'", other.to_string().replace('\\', "\\\\").replace('\'', "''")),
        }
    }
}

/// SQLite: double-quoted identifiers, positional `?` placeholders
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlitePlatform;

impl Platform for SqlitePlatform {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }
}

/// Resolve a platform from its configured name
pub fn platform_by_name(name: &str) -> Option<Box<dyn Platform>> {
    match name.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" | "pg" => Some(Box::new(PostgresPlatform)),
        "mysql" | "mariadb" => Some(Box::new(MySqlPlatform)),
        "sqlite" => Some(Box::new(SqlitePlatform)),
        _ => None,
    }
}
