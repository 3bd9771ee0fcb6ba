use super::{BinaryOperator, Expression, UnaryOperator};
use crate::error::{GraphError, GraphResult};
use crate::types::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Source of property values for row-by-row evaluation
pub trait Row {
    fn value(&self, property: &str) -> GraphResult<Value>;
}

impl Row for HashMap<String, Value> {
    fn value(&self, property: &str) -> GraphResult<Value> {
        self.get(property)
            .cloned()
            .ok_or_else(|| GraphError::UnknownProperty(property.to_string()))
    }
}

impl Expression {
    /// Evaluate against a single row
    ///
    /// Comparisons involving null fail with `TypeError`. `And` / `Or` use
    /// three-valued logic where a failed operand plays the role of unknown:
    /// `false AND x` is false and `true OR x` is true whatever `x` is.
    pub fn evaluate(&self, row: &dyn Row) -> GraphResult<Value> {
        match self {
            Expression::Property(name) => row.value(name),
            Expression::Literal(value) => Ok(value.clone()),
            Expression::BinaryOp { left, op, right } => match op {
                BinaryOperator::And => {
                    let l = left.evaluate_predicate(row);
                    if let Ok(false) = l {
                        return Ok(Value::Bool(false));
                    }
                    match (l, right.evaluate_predicate(row)) {
                        (_, Ok(false)) => Ok(Value::Bool(false)),
                        (Ok(true), Ok(true)) => Ok(Value::Bool(true)),
                        (Err(e), _) | (_, Err(e)) => Err(e),
                        (Ok(false), _) => Ok(Value::Bool(false)),
                    }
                }
                BinaryOperator::Or => {
                    let l = left.evaluate_predicate(row);
                    if let Ok(true) = l {
                        return Ok(Value::Bool(true));
                    }
                    match (l, right.evaluate_predicate(row)) {
                        (_, Ok(true)) => Ok(Value::Bool(true)),
                        (Ok(false), Ok(false)) => Ok(Value::Bool(false)),
                        (Err(e), _) | (_, Err(e)) => Err(e),
                        (Ok(true), _) => Ok(Value::Bool(true)),
                    }
                }
                comparison => {
                    let ordering = left.evaluate(row)?.compare(&right.evaluate(row)?)?;
                    Ok(Value::Bool(compare_matches(*comparison, ordering)))
                }
            },
            Expression::UnaryOp {
                op: UnaryOperator::Not,
                expr,
            } => Ok(Value::Bool(!expr.evaluate_predicate(row)?)),
        }
    }

    /// Evaluate and require a non-null bool
    pub fn evaluate_predicate(&self, row: &dyn Row) -> GraphResult<bool> {
        match self.evaluate(row)? {
            Value::Bool(b) => Ok(b),
            other => Err(GraphError::type_error(format!(
                "{} evaluated to {}, expected bool",
                self,
                other.type_name()
            ))),
        }
    }
}

fn compare_matches(op: BinaryOperator, ordering: Ordering) -> bool {
    match op {
        BinaryOperator::Eq => ordering == Ordering::Equal,
        BinaryOperator::Neq => ordering != Ordering::Equal,
        BinaryOperator::Lt => ordering == Ordering::Less,
        BinaryOperator::Lte => ordering != Ordering::Greater,
        BinaryOperator::Gt => ordering == Ordering::Greater,
        BinaryOperator::Gte => ordering != Ordering::Less,
        BinaryOperator::And | BinaryOperator::Or => false,
    }
}
