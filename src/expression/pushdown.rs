//! Columnar evaluation over whole chunks
//!
//! Literals are broadcast to the chunk length, both sides of a comparison
//! are cast to their common domain and compared with Arrow's `cmp` kernels.
//! `And` / `Or` use Kleene logic, so a null mask slot corresponds exactly
//! to a row where row-wise evaluation fails.

use super::{BinaryOperator, Expression, UnaryOperator};
use crate::error::{GraphError, GraphResult};
use crate::storage::arrow_convert::from_arrow_type;
use crate::types::{ComparisonDomain, Value};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::compute::cast;
use arrow::compute::kernels::boolean;
use arrow::compute::kernels::cmp;
use arrow::datatypes::DataType as ArrowDataType;
use std::collections::HashMap;
use std::sync::Arc;

/// Columns of one chunk, keyed by property name
pub struct ColumnBatch {
    columns: HashMap<String, ArrayRef>,
    num_rows: usize,
}

impl ColumnBatch {
    pub fn new(num_rows: usize) -> Self {
        Self {
            columns: HashMap::new(),
            num_rows,
        }
    }

    /// Add a column; its length must equal the batch length
    pub fn insert(&mut self, name: impl Into<String>, column: ArrayRef) -> GraphResult<()> {
        let name = name.into();
        if column.len() != self.num_rows {
            return Err(GraphError::invalid(format!(
                "column '{}' has {} rows, batch has {}",
                name,
                column.len(),
                self.num_rows
            )));
        }
        self.columns.insert(name, column);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn column(&self, name: &str) -> GraphResult<ArrayRef> {
        self.columns
            .get(name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownProperty(name.to_string()))
    }
}

impl Expression {
    /// Evaluate as a filter mask over `batch`
    ///
    /// # Returns
    /// * `Err(GraphError::TypeError)` if any row evaluates to null
    pub fn evaluate_batch(&self, batch: &ColumnBatch) -> GraphResult<BooleanArray> {
        let result = evaluate_array(self, batch)?;
        let mask = as_bool(self, &result)?;
        if mask.null_count() > 0 {
            return Err(GraphError::type_error(format!(
                "{} is undefined for {} row(s) with null operands",
                self,
                mask.null_count()
            )));
        }
        Ok(mask.clone())
    }
}

fn evaluate_array(expr: &Expression, batch: &ColumnBatch) -> GraphResult<ArrayRef> {
    match expr {
        Expression::Property(name) => batch.column(name),
        Expression::Literal(value) => broadcast(value, batch.num_rows()),
        Expression::BinaryOp { left, op, right } => {
            let l = evaluate_array(left, batch)?;
            let r = evaluate_array(right, batch)?;
            if op.is_logical() {
                let l = as_bool(left, &l)?;
                let r = as_bool(right, &r)?;
                let out = match op {
                    BinaryOperator::And => boolean::and_kleene(l, r)?,
                    _ => boolean::or_kleene(l, r)?,
                };
                return Ok(Arc::new(out));
            }
            let (l, r) = coerce(expr, &l, &r)?;
            let out = match op {
                BinaryOperator::Eq => cmp::eq(&l, &r)?,
                BinaryOperator::Neq => cmp::neq(&l, &r)?,
                BinaryOperator::Lt => cmp::lt(&l, &r)?,
                BinaryOperator::Lte => cmp::lt_eq(&l, &r)?,
                BinaryOperator::Gt => cmp::gt(&l, &r)?,
                BinaryOperator::Gte => cmp::gt_eq(&l, &r)?,
                BinaryOperator::And | BinaryOperator::Or => unreachable!("handled above"),
            };
            Ok(Arc::new(out))
        }
        Expression::UnaryOp {
            op: UnaryOperator::Not,
            expr: inner,
        } => {
            let array = evaluate_array(inner, batch)?;
            Ok(Arc::new(boolean::not(as_bool(inner, &array)?)?))
        }
    }
}

fn as_bool<'a>(expr: &Expression, array: &'a ArrayRef) -> GraphResult<&'a BooleanArray> {
    array
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| {
            GraphError::type_error(format!(
                "{} evaluated to {}, expected bool",
                expr,
                array.data_type()
            ))
        })
}

/// Cast both operands to the Arrow type of their comparison domain
fn coerce(expr: &Expression, l: &ArrayRef, r: &ArrayRef) -> GraphResult<(ArrayRef, ArrayRef)> {
    if l.data_type() == &ArrowDataType::Null || r.data_type() == &ArrowDataType::Null {
        return Err(GraphError::type_error(format!("null operand in {}", expr)));
    }
    let left_type = from_arrow_type(l.data_type())?;
    let right_type = from_arrow_type(r.data_type())?;
    let domain = ComparisonDomain::of(&left_type, &right_type).ok_or_else(|| {
        GraphError::type_error(format!(
            "cannot compare {} with {} in {}",
            left_type, right_type, expr
        ))
    })?;
    let target = match domain {
        ComparisonDomain::Int => ArrowDataType::Int64,
        ComparisonDomain::Float => ArrowDataType::Float64,
        _ => return Ok((l.clone(), r.clone())),
    };
    Ok((cast(l, &target)?, cast(r, &target)?))
}

fn broadcast(value: &Value, len: usize) -> GraphResult<ArrayRef> {
    let array: ArrayRef = match value {
        Value::Null => arrow::array::new_null_array(&ArrowDataType::Null, len),
        Value::Bool(v) => Arc::new(BooleanArray::from(vec![*v; len])),
        Value::Int32(v) => Arc::new(Int32Array::from_value(*v, len)),
        Value::Int64(v) => Arc::new(Int64Array::from_value(*v, len)),
        Value::Float32(v) => Arc::new(Float32Array::from_value(*v, len)),
        Value::Float64(v) => Arc::new(Float64Array::from_value(*v, len)),
        Value::String(v) => Arc::new(StringArray::from(vec![v.as_str(); len])),
        Value::Date(v) => Arc::new(Date32Array::from_value(*v, len)),
        Value::Timestamp(v) => Arc::new(TimestampMillisecondArray::from_value(*v, len)),
    };
    Ok(array)
}
