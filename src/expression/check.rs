use super::{BinaryOperator, Expression, UnaryOperator};
use crate::error::{GraphError, GraphResult};
use crate::info::{DataType, EdgeInfo, VertexInfo};
use crate::types::ComparisonDomain;
use std::collections::HashMap;

/// Declared property types an expression is checked against
pub trait PropertySchema {
    /// # Returns
    /// * `Err(GraphError::UnknownProperty)` if `name` is not declared
    fn lookup_type(&self, name: &str) -> GraphResult<DataType>;
}

impl PropertySchema for VertexInfo {
    fn lookup_type(&self, name: &str) -> GraphResult<DataType> {
        self.property_type(name).cloned()
    }
}

impl PropertySchema for EdgeInfo {
    fn lookup_type(&self, name: &str) -> GraphResult<DataType> {
        self.property_type(name).cloned()
    }
}

impl PropertySchema for HashMap<String, DataType> {
    fn lookup_type(&self, name: &str) -> GraphResult<DataType> {
        self.get(name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownProperty(name.to_string()))
    }
}

impl Expression {
    /// Static type of the expression
    ///
    /// Comparisons need operands with a common domain (integers with
    /// integers, floats with any number, other types with themselves) and
    /// yield `bool`; logical operators need `bool` operands. A null literal
    /// has no type and is rejected wherever it appears as an operand.
    pub fn check(&self, schema: &dyn PropertySchema) -> GraphResult<DataType> {
        match self {
            Expression::Property(name) => {
                let data_type = schema.lookup_type(name)?;
                if data_type.is_list() {
                    return Err(GraphError::type_error(format!(
                        "property '{}' of type {} cannot be filtered",
                        name, data_type
                    )));
                }
                Ok(data_type)
            }
            Expression::Literal(value) => value
                .data_type()
                .ok_or_else(|| GraphError::type_error("null literal in expression")),
            Expression::BinaryOp { left, op, right } => {
                let left_type = left.check(schema)?;
                let right_type = right.check(schema)?;
                if op.is_logical() {
                    expect_bool(&left_type, *op)?;
                    expect_bool(&right_type, *op)?;
                } else if ComparisonDomain::of(&left_type, &right_type).is_none() {
                    return Err(GraphError::type_error(format!(
                        "cannot compare {} with {} in {}",
                        left_type, right_type, self
                    )));
                }
                Ok(DataType::Bool)
            }
            Expression::UnaryOp {
                op: UnaryOperator::Not,
                expr,
            } => {
                let inner = expr.check(schema)?;
                if inner != DataType::Bool {
                    return Err(GraphError::type_error(format!(
                        "NOT expects bool, got {}",
                        inner
                    )));
                }
                Ok(DataType::Bool)
            }
        }
    }

    /// Check that the expression is a usable filter predicate
    pub fn check_predicate(&self, schema: &dyn PropertySchema) -> GraphResult<()> {
        let data_type = self.check(schema)?;
        if data_type != DataType::Bool {
            return Err(GraphError::type_error(format!(
                "filter {} evaluates to {}, expected bool",
                self, data_type
            )));
        }
        Ok(())
    }
}

fn expect_bool(data_type: &DataType, op: BinaryOperator) -> GraphResult<()> {
    if *data_type != DataType::Bool {
        return Err(GraphError::type_error(format!(
            "{} expects bool operands, got {}",
            op.symbol(),
            data_type
        )));
    }
    Ok(())
}
