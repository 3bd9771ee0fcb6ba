//! Filter expressions
//!
//! A closed set of nodes: property references, literals, the six
//! comparisons and `And` / `Or` / `Not`. Expressions are checked statically
//! against a schema, then evaluated either row by row (`eval`) or over whole
//! chunk columns with Arrow kernels (`pushdown`). Both paths agree on the
//! matching rows and on when evaluation fails.

pub mod check;
pub mod eval;
pub mod pushdown;

pub use check::PropertySchema;
pub use eval::Row;

use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Column reference
    Property(String),

    /// Constant
    Literal(Value),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    /// Unary operation: op expr
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,

    // Logical
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Not,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        !self.is_logical()
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::Neq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Lte => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Gte => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        }
    }
}

impl Expression {
    /// Property names the expression reads, sorted
    pub fn referenced_properties(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.collect_properties(&mut names);
        names.into_iter().collect()
    }

    fn collect_properties(&self, names: &mut BTreeSet<String>) {
        match self {
            Expression::Property(name) => {
                names.insert(name.clone());
            }
            Expression::Literal(_) => {}
            Expression::BinaryOp { left, right, .. } => {
                left.collect_properties(names);
                right.collect_properties(names);
            }
            Expression::UnaryOp { expr, .. } => expr.collect_properties(names),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Property(name) => write!(f, "{}", name),
            Expression::Literal(Value::String(s)) => write!(f, "'{}'", s),
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::BinaryOp { left, op, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expression::UnaryOp {
                op: UnaryOperator::Not,
                expr,
            } => write!(f, "NOT {}", expr),
        }
    }
}

pub fn prop(name: impl Into<String>) -> Expression {
    Expression::Property(name.into())
}

pub fn lit(value: impl Into<Value>) -> Expression {
    Expression::Literal(value.into())
}

fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
    Expression::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

pub fn eq(left: Expression, right: Expression) -> Expression {
    binary(left, BinaryOperator::Eq, right)
}

pub fn neq(left: Expression, right: Expression) -> Expression {
    binary(left, BinaryOperator::Neq, right)
}

pub fn lt(left: Expression, right: Expression) -> Expression {
    binary(left, BinaryOperator::Lt, right)
}

pub fn lte(left: Expression, right: Expression) -> Expression {
    binary(left, BinaryOperator::Lte, right)
}

pub fn gt(left: Expression, right: Expression) -> Expression {
    binary(left, BinaryOperator::Gt, right)
}

pub fn gte(left: Expression, right: Expression) -> Expression {
    binary(left, BinaryOperator::Gte, right)
}

pub fn and(left: Expression, right: Expression) -> Expression {
    binary(left, BinaryOperator::And, right)
}

pub fn or(left: Expression, right: Expression) -> Expression {
    binary(left, BinaryOperator::Or, right)
}

pub fn not(expr: Expression) -> Expression {
    Expression::UnaryOp {
        op: UnaryOperator::Not,
        expr: Box::new(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let expr = and(gt(prop("age"), lit(15)), not(eq(prop("name"), lit("bob"))));
        assert_eq!(expr.to_string(), "((age > 15) AND NOT (name = 'bob'))");
    }

    #[test]
    fn test_referenced_properties() {
        let expr = or(
            lt(prop("b"), prop("a")),
            and(eq(prop("a"), lit(1)), gte(prop("c"), lit(2.5))),
        );
        assert_eq!(expr.referenced_properties(), vec!["a", "b", "c"]);
        assert!(lit(true).referenced_properties().is_empty());
    }

    #[test]
    fn test_operator_kinds() {
        assert!(BinaryOperator::Lte.is_comparison());
        assert!(BinaryOperator::Or.is_logical());
    }

    #[test]
    fn test_serde_round_trip() {
        let expr = neq(prop("age"), lit(3_i64));
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }
}
