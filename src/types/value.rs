use crate::error::{GraphError, GraphResult};
use crate::info::DataType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A dynamically typed property value
///
/// One variant per scalar `DataType`, plus `Null` for absent values of
/// nullable properties. Every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    /// Days since the UNIX epoch
    Date(i32),
    /// Milliseconds since the UNIX epoch
    Timestamp(i64),
}

/// Common domain two operands are compared in
///
/// Integers widen to `i64`, anything mixing in a float widens to `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonDomain {
    Bool,
    Int,
    Float,
    String,
    Date,
    Timestamp,
}

impl ComparisonDomain {
    /// Domain for two declared types, `None` if they cannot be compared
    pub fn of(left: &DataType, right: &DataType) -> Option<Self> {
        use DataType::*;
        match (left, right) {
            (Bool, Bool) => Some(ComparisonDomain::Bool),
            (String, String) => Some(ComparisonDomain::String),
            (Date, Date) => Some(ComparisonDomain::Date),
            (Timestamp, Timestamp) => Some(ComparisonDomain::Timestamp),
            (Int32 | Int64, Int32 | Int64) => Some(ComparisonDomain::Int),
            (Int32 | Int64 | Float | Double, Int32 | Int64 | Float | Double) => {
                Some(ComparisonDomain::Float)
            }
            _ => None,
        }
    }
}

impl Value {
    /// Declared type this value carries, `None` for `Null`
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Bool),
            Value::Int32(_) => Some(DataType::Int32),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float32(_) => Some(DataType::Float),
            Value::Float64(_) => Some(DataType::Double),
            Value::String(_) => Some(DataType::String),
            Value::Date(_) => Some(DataType::Date),
            Value::Timestamp(_) => Some(DataType::Timestamp),
        }
    }

    pub fn type_name(&self) -> String {
        self.data_type()
            .map(|dt| dt.to_string())
            .unwrap_or_else(|| "null".to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value can be stored in a column of `data_type`
    pub fn conforms_to(&self, data_type: &DataType) -> bool {
        match self.data_type() {
            None => true,
            Some(dt) => &dt == data_type,
        }
    }

    /// Compare two values in their common domain
    ///
    /// Fails with `TypeError` on nulls or incompatible operands. Floats use
    /// IEEE total ordering so that NaN compares consistently.
    pub fn compare(&self, other: &Value) -> GraphResult<Ordering> {
        let (left, right) = match (self.data_type(), other.data_type()) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                return Err(GraphError::type_error(format!(
                    "cannot compare {} with {}",
                    self.type_name(),
                    other.type_name()
                )))
            }
        };
        let domain = ComparisonDomain::of(&left, &right).ok_or_else(|| {
            GraphError::type_error(format!("cannot compare {} with {}", left, right))
        })?;

        let ordering = match domain {
            ComparisonDomain::Bool => match (self, other) {
                (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
                _ => unreachable!("domain derived from operand types"),
            },
            ComparisonDomain::String => match (self, other) {
                (Value::String(a), Value::String(b)) => a.cmp(b),
                _ => unreachable!("domain derived from operand types"),
            },
            ComparisonDomain::Date => match (self, other) {
                (Value::Date(a), Value::Date(b)) => a.cmp(b),
                _ => unreachable!("domain derived from operand types"),
            },
            ComparisonDomain::Timestamp => match (self, other) {
                (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
                _ => unreachable!("domain derived from operand types"),
            },
            ComparisonDomain::Int => self.widen_i64().cmp(&other.widen_i64()),
            ComparisonDomain::Float => self.widen_f64().total_cmp(&other.widen_f64()),
        };
        Ok(ordering)
    }

    fn widen_i64(&self) -> i64 {
        match self {
            Value::Int32(v) => *v as i64,
            Value::Int64(v) => *v,
            _ => 0,
        }
    }

    fn widen_f64(&self) -> f64 {
        match self {
            Value::Int32(v) => *v as f64,
            Value::Int64(v) => *v as f64,
            Value::Float32(v) => *v as f64,
            Value::Float64(v) => *v,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "date({})", v),
            Value::Timestamp(v) => write!(f, "timestamp({})", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Rust types a property value can be read back as
pub trait FromValue: Sized {
    fn from_value(value: Value, property: &str) -> GraphResult<Self>;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident, $expected:expr) => {
        impl FromValue for $ty {
            fn from_value(value: Value, property: &str) -> GraphResult<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    Value::Null => Err(GraphError::type_error(format!(
                        "property '{}' is null",
                        property
                    ))),
                    other => Err(GraphError::TypeMismatch {
                        property: property.to_string(),
                        expected: $expected.to_string(),
                        actual: other.type_name(),
                    }),
                }
            }
        }
    };
}

impl_from_value!(bool, Bool, "bool");
impl_from_value!(i32, Int32, "int32");
impl_from_value!(i64, Int64, "int64");
impl_from_value!(f32, Float32, "float");
impl_from_value!(f64, Float64, "double");
impl_from_value!(String, String, "string");

impl FromValue for Value {
    fn from_value(value: Value, _property: &str) -> GraphResult<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value, property: &str) -> GraphResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, property).map(Some),
        }
    }
}
