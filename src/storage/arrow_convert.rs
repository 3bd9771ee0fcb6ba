//! Conversions between the schema model and Arrow
//!
//! Mapping:
//! - bool      → Boolean
//! - int32     → Int32
//! - int64     → Int64
//! - float     → Float32
//! - double    → Float64
//! - string    → Utf8
//! - date      → Date32
//! - timestamp → Timestamp(Millisecond)

use crate::error::{GraphError, GraphResult};
use crate::info::{Cardinality, DataType, Property, PropertyGroup};
use crate::types::{IdType, Value};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::{DataType as ArrowDataType, Field, Schema, SchemaRef, TimeUnit};
use std::sync::Arc;

pub fn to_arrow_type(data_type: &DataType) -> GraphResult<ArrowDataType> {
    Ok(match data_type {
        DataType::Bool => ArrowDataType::Boolean,
        DataType::Int32 => ArrowDataType::Int32,
        DataType::Int64 => ArrowDataType::Int64,
        DataType::Float => ArrowDataType::Float32,
        DataType::Double => ArrowDataType::Float64,
        DataType::String => ArrowDataType::Utf8,
        DataType::Date => ArrowDataType::Date32,
        DataType::Timestamp => ArrowDataType::Timestamp(TimeUnit::Millisecond, None),
        DataType::List(_) => {
            return Err(GraphError::Unsupported(format!(
                "{} columns are not stored",
                data_type
            )))
        }
    })
}

pub fn from_arrow_type(data_type: &ArrowDataType) -> GraphResult<DataType> {
    Ok(match data_type {
        ArrowDataType::Boolean => DataType::Bool,
        ArrowDataType::Int32 => DataType::Int32,
        ArrowDataType::Int64 => DataType::Int64,
        ArrowDataType::Float32 => DataType::Float,
        ArrowDataType::Float64 => DataType::Double,
        ArrowDataType::Utf8 => DataType::String,
        ArrowDataType::Date32 => DataType::Date,
        ArrowDataType::Timestamp(TimeUnit::Millisecond, _) => DataType::Timestamp,
        other => {
            return Err(GraphError::Unsupported(format!(
                "arrow type {} has no property type",
                other
            )))
        }
    })
}

/// Reject properties the chunk files cannot hold
pub fn ensure_storable(property: &Property) -> GraphResult<()> {
    if property.cardinality != Cardinality::Single {
        return Err(GraphError::Unsupported(format!(
            "property '{}' has {} cardinality",
            property.name, property.cardinality
        )));
    }
    if property.data_type.is_list() {
        return Err(GraphError::Unsupported(format!(
            "property '{}' has type {}",
            property.name, property.data_type
        )));
    }
    Ok(())
}

pub fn property_field(property: &Property) -> GraphResult<Field> {
    ensure_storable(property)?;
    Ok(Field::new(
        &property.name,
        to_arrow_type(&property.data_type)?,
        property.is_nullable,
    ))
}

/// Arrow schema of one property group's chunk files
pub fn group_schema(group: &PropertyGroup) -> GraphResult<SchemaRef> {
    let fields = group
        .properties()
        .iter()
        .map(property_field)
        .collect::<GraphResult<Vec<_>>>()?;
    Ok(Arc::new(Schema::new(fields)))
}

macro_rules! collect_column {
    ($values:expr, $property:expr, $expected:expr, $variant:ident) => {
        $values
            .iter()
            .map(|v| match v {
                Value::Null => Ok(None),
                Value::$variant(x) => Ok(Some(x.clone())),
                other => Err(GraphError::TypeMismatch {
                    property: $property.to_string(),
                    expected: $expected.to_string(),
                    actual: other.type_name(),
                }),
            })
            .collect::<GraphResult<Vec<_>>>()?
    };
}

/// Build a column of `data_type` from dynamic values
pub fn values_to_array(property: &str, data_type: &DataType, values: &[Value]) -> GraphResult<ArrayRef> {
    let array: ArrayRef = match data_type {
        DataType::Bool => Arc::new(BooleanArray::from(collect_column!(values, property, data_type, Bool))),
        DataType::Int32 => Arc::new(Int32Array::from(collect_column!(values, property, data_type, Int32))),
        DataType::Int64 => Arc::new(Int64Array::from(collect_column!(values, property, data_type, Int64))),
        DataType::Float => Arc::new(Float32Array::from(collect_column!(values, property, data_type, Float32))),
        DataType::Double => Arc::new(Float64Array::from(collect_column!(values, property, data_type, Float64))),
        DataType::String => Arc::new(StringArray::from(collect_column!(values, property, data_type, String))),
        DataType::Date => Arc::new(Date32Array::from(collect_column!(values, property, data_type, Date))),
        DataType::Timestamp => Arc::new(TimestampMillisecondArray::from(collect_column!(
            values, property, data_type, Timestamp
        ))),
        DataType::List(_) => {
            return Err(GraphError::Unsupported(format!(
                "property '{}' has type {}",
                property, data_type
            )))
        }
    };
    Ok(array)
}

fn downcast<T: 'static>(array: &dyn Array) -> GraphResult<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        GraphError::type_error(format!("unexpected column type {}", array.data_type()))
    })
}

/// Cell of a column as a dynamic value
pub fn value_at(array: &dyn Array, row: usize) -> GraphResult<Value> {
    if row >= array.len() {
        return Err(GraphError::invalid(format!(
            "row {} out of bounds for column of length {}",
            row,
            array.len()
        )));
    }
    if array.is_null(row) {
        return Ok(Value::Null);
    }
    Ok(match array.data_type() {
        ArrowDataType::Boolean => Value::Bool(downcast::<BooleanArray>(array)?.value(row)),
        ArrowDataType::Int32 => Value::Int32(downcast::<Int32Array>(array)?.value(row)),
        ArrowDataType::Int64 => Value::Int64(downcast::<Int64Array>(array)?.value(row)),
        ArrowDataType::Float32 => Value::Float32(downcast::<Float32Array>(array)?.value(row)),
        ArrowDataType::Float64 => Value::Float64(downcast::<Float64Array>(array)?.value(row)),
        ArrowDataType::Utf8 => Value::String(downcast::<StringArray>(array)?.value(row).to_string()),
        ArrowDataType::Date32 => Value::Date(downcast::<Date32Array>(array)?.value(row)),
        ArrowDataType::Timestamp(TimeUnit::Millisecond, _) => {
            Value::Timestamp(downcast::<TimestampMillisecondArray>(array)?.value(row))
        }
        other => {
            return Err(GraphError::Unsupported(format!(
                "cannot read cells of arrow type {}",
                other
            )))
        }
    })
}

/// Every cell of a column
pub fn column_values(array: &dyn Array) -> GraphResult<Vec<Value>> {
    (0..array.len()).map(|row| value_at(array, row)).collect()
}

pub fn id_array(ids: &[IdType]) -> ArrayRef {
    Arc::new(Int64Array::from(ids.to_vec()))
}

/// Non-null int64 column as ids
pub fn id_values(array: &dyn Array) -> GraphResult<Vec<IdType>> {
    let ints = downcast::<Int64Array>(array)?;
    if ints.null_count() > 0 {
        return Err(GraphError::type_error("id column contains nulls"));
    }
    Ok(ints.values().to_vec())
}

/// Bool column with nulls read as `false`
pub fn flag_values(array: &dyn Array) -> GraphResult<Vec<bool>> {
    let flags = downcast::<BooleanArray>(array)?;
    Ok((0..flags.len())
        .map(|i| flags.is_valid(i) && flags.value(i))
        .collect())
}
