use super::arrow_convert::{column_values, from_arrow_type, values_to_array};
use super::{open_chunk, ColumnarCodec};
use crate::error::{GraphError, GraphResult};
use crate::info::DataType;
use crate::types::Value;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::path::Path;
use std::sync::Arc;

/// CSV chunk files with a header row
///
/// Empty fields of nullable columns read back as null, so an empty string
/// in a nullable string column does not survive a round trip.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvCodec;

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::Float32(v) => v.to_string(),
        Value::Float64(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Date(v) => v.to_string(),
        Value::Timestamp(v) => v.to_string(),
    }
}

fn parse_cell(text: &str, name: &str, data_type: &DataType, nullable: bool) -> GraphResult<Value> {
    if text.is_empty() && (nullable || *data_type != DataType::String) {
        return Ok(Value::Null);
    }
    let mismatch = || GraphError::TypeMismatch {
        property: name.to_string(),
        expected: data_type.to_string(),
        actual: format!("text '{}'", text),
    };
    Ok(match data_type {
        DataType::Bool => Value::Bool(text.parse().map_err(|_| mismatch())?),
        DataType::Int32 => Value::Int32(text.parse().map_err(|_| mismatch())?),
        DataType::Int64 => Value::Int64(text.parse().map_err(|_| mismatch())?),
        DataType::Float => Value::Float32(text.parse().map_err(|_| mismatch())?),
        DataType::Double => Value::Float64(text.parse().map_err(|_| mismatch())?),
        DataType::String => Value::String(text.to_string()),
        DataType::Date => Value::Date(text.parse().map_err(|_| mismatch())?),
        DataType::Timestamp => Value::Timestamp(text.parse().map_err(|_| mismatch())?),
        DataType::List(_) => return Err(mismatch()),
    })
}

impl ColumnarCodec for CsvCodec {
    fn write_batch(&self, path: &Path, batch: &RecordBatch) -> GraphResult<()> {
        let schema = batch.schema();
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;

        let columns = batch
            .columns()
            .iter()
            .map(|c| column_values(c.as_ref()))
            .collect::<GraphResult<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            writer.write_record(columns.iter().map(|c| cell_text(&c[row])))?;
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
        let file = open_chunk(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);
        let headers = reader.headers()?.clone();

        let indices: Vec<usize> = match projection {
            Some(p) => p.to_vec(),
            None => (0..schema.fields().len()).collect(),
        };

        let mut columns = Vec::with_capacity(indices.len());
        for &i in &indices {
            let field = schema.field(i);
            let position = headers
                .iter()
                .position(|h| h == field.name())
                .ok_or_else(|| {
                    GraphError::NotFound(format!(
                        "column '{}' in {}",
                        field.name(),
                        path.display()
                    ))
                })?;
            columns.push((
                field.name().clone(),
                from_arrow_type(field.data_type())?,
                field.is_nullable(),
                position,
                Vec::new(),
            ));
        }

        let mut rows = 0;
        for record in reader.records() {
            let record = record?;
            for (name, data_type, nullable, position, cells) in columns.iter_mut() {
                let text = record.get(*position).unwrap_or("");
                cells.push(parse_cell(text, name, data_type, *nullable)?);
            }
            rows += 1;
        }

        let arrays = columns
            .iter()
            .map(|(name, data_type, _, _, cells)| values_to_array(name, data_type, cells))
            .collect::<GraphResult<Vec<_>>>()?;
        let options = RecordBatchOptions::new().with_row_count(Some(rows));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(schema.project(&indices)?),
            arrays,
            &options,
        )?)
    }

    fn row_count(&self, path: &Path, _schema: &SchemaRef) -> GraphResult<usize> {
        let file = open_chunk(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);
        let mut rows = 0;
        for record in reader.records() {
            record?;
            rows += 1;
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::arrow_convert::value_at;
    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType as ArrowDataType, Field, Schema};
    use tempfile::TempDir;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("id", ArrowDataType::Int64, false),
            Field::new("name", ArrowDataType::Utf8, true),
            Field::new("score", ArrowDataType::Float64, true),
        ]))
    }

    #[test]
    fn test_csv_round_trip_with_nulls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunk0");
        let batch = RecordBatch::try_new(
            schema(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec![Some("ann, jr"), None])),
                Arc::new(Float64Array::from(vec![Some(0.1), Some(2.5)])),
            ],
        )
        .unwrap();
        CsvCodec.write_batch(&path, &batch).unwrap();

        let read = CsvCodec.read_batch(&path, &schema(), None).unwrap();
        assert_eq!(read.num_rows(), 2);
        assert_eq!(
            value_at(read.column(1).as_ref(), 0).unwrap(),
            Value::from("ann, jr")
        );
        assert_eq!(value_at(read.column(1).as_ref(), 1).unwrap(), Value::Null);
        assert_eq!(
            value_at(read.column(2).as_ref(), 0).unwrap(),
            Value::Float64(0.1)
        );
        assert_eq!(CsvCodec.row_count(&path, &schema()).unwrap(), 2);
    }

    #[test]
    fn test_csv_projection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunk0");
        let batch = RecordBatch::try_new(
            schema(),
            vec![
                Arc::new(Int64Array::from(vec![7])),
                Arc::new(StringArray::from(vec![Some("x")])),
                Arc::new(Float64Array::from(vec![None])),
            ],
        )
        .unwrap();
        CsvCodec.write_batch(&path, &batch).unwrap();

        let read = CsvCodec.read_batch(&path, &schema(), Some(&[2, 0])).unwrap();
        assert_eq!(read.schema().field(0).name(), "score");
        assert_eq!(value_at(read.column(0).as_ref(), 0).unwrap(), Value::Null);
        assert_eq!(value_at(read.column(1).as_ref(), 0).unwrap(), Value::Int64(7));
    }

    #[test]
    fn test_parse_cell_rejects_garbage() {
        let err = parse_cell("abc", "age", &DataType::Int32, true).unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { .. }));
    }
}
