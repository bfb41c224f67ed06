//! Predicate operators and connectors

use crate::errors::QueryError;
use std::fmt;
use std::str::FromStr;

/// Closed set of comparison operators understood by the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,              // =
    NotEqual,           // !=
    LessThan,           // <
    LessThanOrEqual,    // <=
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    In,                 // in
    NotIn,              // nin
    Like,               // like
    NotLike,            // nlike
    Null,               // null
    NotNull,            // nnull
    Between,            // between
    NotBetween,         // nbetween
}

impl Operator {
    /// Wire name used by string-based callers
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::In => "in",
            Operator::NotIn => "nin",
            Operator::Like => "like",
            Operator::NotLike => "nlike",
            Operator::Null => "null",
            Operator::NotNull => "nnull",
            Operator::Between => "between",
            Operator::NotBetween => "nbetween",
        }
    }

    /// Counterpart for operators that have a dedicated negative form
    pub fn complement(&self) -> Option<Operator> {
        match self {
            Operator::In => Some(Operator::NotIn),
            Operator::NotIn => Some(Operator::In),
            Operator::Like => Some(Operator::NotLike),
            Operator::NotLike => Some(Operator::Like),
            Operator::Null => Some(Operator::NotNull),
            Operator::NotNull => Some(Operator::Null),
            Operator::Between => Some(Operator::NotBetween),
            Operator::NotBetween => Some(Operator::Between),
            _ => None,
        }
    }

    /// Apply a negation flag.
    ///
    /// Returns the operator to render and whether the rendered expression still
    /// needs a generic `NOT (...)` wrapper. Equality becomes `!=`; operators with
    /// a negative form switch to it; everything else keeps its symbol.
    pub fn negated(self, negated: bool) -> (Operator, bool) {
        if !negated {
            return (self, false);
        }

        match self {
            Operator::Equal => (Operator::NotEqual, false),
            other => match other.complement() {
                Some(complement) => (complement, false),
                None => (other, true),
            },
        }
    }

    /// SQL symbol for plain binary comparisons
    pub(crate) fn sql_symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Null => "IS NULL",
            Operator::NotNull => "IS NOT NULL",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            "in" => Ok(Operator::In),
            "nin" => Ok(Operator::NotIn),
            "like" => Ok(Operator::Like),
            "nlike" => Ok(Operator::NotLike),
            "null" => Ok(Operator::Null),
            "nnull" => Ok(Operator::NotNull),
            "between" => Ok(Operator::Between),
            "nbetween" => Ok(Operator::NotBetween),
            other => Err(QueryError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean joiner attached to a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_operators() {
        let all = [
            "=", "!=", "<", "<=", ">", ">=", "in", "nin", "like", "nlike", "null", "nnull",
            "between", "nbetween",
        ];

        for wire in all {
            let operator: Operator = wire.parse().unwrap();
            assert_eq!(operator.as_str(), wire);
        }
    }

    #[test]
    fn test_parse_unknown_operator() {
        let err = "<>".parse::<Operator>().unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedOperator(ref op) if op == "<>"));
        assert!(err.is_configuration());

        assert!("LIKE".parse::<Operator>().is_err());
    }

    #[test]
    fn test_negation() {
        assert_eq!(Operator::Equal.negated(true), (Operator::NotEqual, false));
        assert_eq!(Operator::In.negated(true), (Operator::NotIn, false));
        assert_eq!(Operator::NotIn.negated(true), (Operator::In, false));
        assert_eq!(Operator::Like.negated(true), (Operator::NotLike, false));
        assert_eq!(Operator::Null.negated(true), (Operator::NotNull, false));
        assert_eq!(Operator::Between.negated(true), (Operator::NotBetween, false));
        assert_eq!(Operator::GreaterThan.negated(true), (Operator::GreaterThan, true));
        assert_eq!(Operator::NotEqual.negated(true), (Operator::NotEqual, true));
        assert_eq!(Operator::LessThan.negated(false), (Operator::LessThan, false));
    }

    #[test]
    fn test_connector_sql() {
        assert_eq!(Connector::And.to_sql(), "AND");
        assert_eq!(Connector::Or.to_sql(), "OR");
        assert_eq!(Connector::default(), Connector::And);
    }
}
