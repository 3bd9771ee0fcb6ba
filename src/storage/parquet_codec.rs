use super::{open_chunk, ColumnarCodec};
use crate::error::GraphResult;
use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::{ArrowWriter, ProjectionMask};
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Parquet chunk files with the Arrow schema embedded
#[derive(Debug, Default, Clone, Copy)]
pub struct ParquetCodec;

impl ColumnarCodec for ParquetCodec {
    fn write_batch(&self, path: &Path, batch: &RecordBatch) -> GraphResult<()> {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
        Ok(())
    }

    fn read_batch(
        &self,
        path: &Path,
        schema: &SchemaRef,
        projection: Option<&[usize]>,
    ) -> GraphResult<RecordBatch> {
        let file = open_chunk(path)?;
        let mut builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        // parquet yields projected columns in file order
        let mut ranks = None;
        let out_schema = match projection {
            Some(indices) => {
                let mut sorted = indices.to_vec();
                sorted.sort_unstable();
                sorted.dedup();
                let mask = ProjectionMask::roots(builder.parquet_schema(), sorted.iter().copied());
                builder = builder.with_projection(mask);
                ranks = Some(
                    indices
                        .iter()
                        .map(|i| sorted.binary_search(i).unwrap_or_default())
                        .collect::<Vec<_>>(),
                );
                Arc::new(schema.project(indices)?)
            }
            None => schema.clone(),
        };

        let reader = builder.build()?;
        let batches = reader.collect::<Result<Vec<_>, _>>()?;
        let batch = match batches.first() {
            None => return Ok(RecordBatch::new_empty(out_schema)),
            Some(first) => concat_batches(&first.schema(), &batches)?,
        };
        match ranks {
            Some(ranks) => Ok(batch.project(&ranks)?),
            None => Ok(batch),
        }
    }

    fn row_count(&self, path: &Path, _schema: &SchemaRef) -> GraphResult<usize> {
        let file = open_chunk(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        Ok(builder.metadata().file_metadata().num_rows() as usize)
    }
}
