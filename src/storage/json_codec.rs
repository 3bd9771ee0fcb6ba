use super::arrow_convert::{column_values, from_arrow_type, values_to_array};
use super::{open_chunk, ColumnarCodec};
use crate::error::{GraphError, GraphResult};
use crate::info::DataType;
use crate::types::Value;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde_json::{Map, Number, Value as JsonValue};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// JSON-lines chunk files, one object per row
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

fn to_json(name: &str, value: &Value) -> GraphResult<JsonValue> {
    let float = |v: f64| {
        Number::from_f64(v).map(JsonValue::Number).ok_or_else(|| {
            GraphError::invalid(format!("non-finite value {} in '{}' cannot be stored as json", v, name))
        })
    };
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::Int32(v) => JsonValue::from(*v),
        Value::Int64(v) => JsonValue::from(*v),
        Value::Float32(v) => float(*v as f64)?,
        Value::Float64(v) => float(*v)?,
        Value::String(v) => JsonValue::String(v.clone()),
        Value::Date(v) => JsonValue::from(*v),
        Value::Timestamp(v) => JsonValue::from(*v),
    })
}

fn from_json(name: &str, json: Option<&JsonValue>, data_type: &DataType) -> GraphResult<Value> {
    let json = match json {
        None | Some(JsonValue::Null) => return Ok(Value::Null),
        Some(json) => json,
    };
    let mismatch = || GraphError::TypeMismatch {
        property: name.to_string(),
        expected: data_type.to_string(),
        actual: format!("json {}", json),
    };
    let int = || json.as_i64().ok_or_else(mismatch);
    Ok(match data_type {
        DataType::Bool => Value::Bool(json.as_bool().ok_or_else(mismatch)?),
        DataType::Int32 => Value::Int32(i32::try_from(int()?).map_err(|_| mismatch())?),
        DataType::Int64 => Value::Int64(int()?),
        DataType::Float => Value::Float32(json.as_f64().ok_or_else(mismatch)? as f32),
        DataType::Double => Value::Float64(json.as_f64().ok_or_else(mismatch)?),
        DataType::String => Value::String(json.as_str().ok_or_else(mismatch)?.to_string()),
        DataType::Date => Value::Date(i32::try_from(int()?).map_err(|_| mismatch())?),
        DataType::Timestamp => Value::Timestamp(int()?),
        DataType::List(_) => return Err(mismatch()),
    })
}

impl JsonCodec {
    fn read_rows(&self, path: &Path) -> GraphResult<Vec<Map<String, JsonValue>>> {
        let reader = BufReader::new(open_chunk(path)?);
        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(&line)?);
        }
        Ok(rows)
    }
}

impl ColumnarCodec for JsonCodec {
    fn write_batch(&self, path: &Path, batch: &RecordBatch) -> GraphResult<()> {
        let schema = batch.schema();
        let columns = batch
            .columns()
            .iter()
            .map(|c| column_values(c.as_ref()))
            .collect::<GraphResult<Vec<_>>>()?;

        let mut writer = BufWriter::new(File::create(path)?);
        for row in 0..batch.num_rows() {
            let mut object = Map::new();
            for (field, column) in schema.fields().iter().zip(&columns) {
                object.insert(field.name().clone(), to_json(field.name(), &column[row])?);
            }
            serde_json::to_writer(&mut writer, &object)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_batch(
        &self,
        path: &Path,
        schema: &SchemaRef,
        projection: Option<&[usize]>,
    ) -> GraphResult<RecordBatch> {
        let rows = self.read_rows(path)?;
        let indices: Vec<usize> = match projection {
            Some(p) => p.to_vec(),
            None => (0..schema.fields().len()).collect(),
        };

        let mut arrays = Vec::with_capacity(indices.len());
        for &i in &indices {
            let field = schema.field(i);
            let data_type = from_arrow_type(field.data_type())?;
            let values = rows
                .iter()
                .map(|row| from_json(field.name(), row.get(field.name()), &data_type))
                .collect::<GraphResult<Vec<_>>>()?;
            arrays.push(values_to_array(field.name(), &data_type, &values)?);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(schema.project(&indices)?),
            arrays,
            &options,
        )?)
    }

    fn row_count(&self, path: &Path, _schema: &SchemaRef) -> GraphResult<usize> {
        Ok(self.read_rows(path)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::arrow_convert::value_at;
    use arrow::array::{Date32Array, Int32Array};
    use arrow::datatypes::{DataType as ArrowDataType, Field, Schema};
    use tempfile::TempDir;

    #[test]
    fn test_json_lines_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunk0");
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", ArrowDataType::Int32, true),
            Field::new("born", ArrowDataType::Date32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![Some(3), None])),
                Arc::new(Date32Array::from(vec![Some(19000), Some(-1)])),
            ],
        )
        .unwrap();
        JsonCodec.write_batch(&path, &batch).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);

        let read = JsonCodec.read_batch(&path, &schema, None).unwrap();
        assert_eq!(value_at(read.column(0).as_ref(), 1).unwrap(), Value::Null);
        assert_eq!(
            value_at(read.column(1).as_ref(), 0).unwrap(),
            Value::Date(19000)
        );
        assert_eq!(JsonCodec.row_count(&path, &schema).unwrap(), 2);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(to_json("x", &Value::Float64(f64::NAN)).is_err());
    }

    #[test]
    fn test_out_of_range_int32() {
        let json = JsonValue::from(i64::MAX);
        let err = from_json("age", Some(&json), &DataType::Int32).unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { .. }));
    }
}
