//! Chunk store adapter
//!
//! This module maps the schema model onto chunk files:
//! - ColumnarCodec trait: typed batch read/write for one file
//! - Parquet / CSV / JSON codecs
//! - ChunkLayout: version-resolved file naming
//! - ChunkStore: group, label, adjacency, offset and count I/O

pub mod arrow_convert;
pub mod chunk_store;
pub mod csv_codec;
pub mod json_codec;
pub mod layout;
pub mod parquet_codec;

pub use chunk_store::ChunkStore;
pub use csv_codec::CsvCodec;
pub use json_codec::JsonCodec;
pub use layout::{ChunkLayout, DST_INDEX_COL, OFFSET_COL, SRC_INDEX_COL};
pub use parquet_codec::ParquetCodec;

use crate::error::{GraphError, GraphResult};
use crate::info::FileType;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::path::Path;

/// Columnar file codec
///
/// One call reads or writes one whole chunk file. Implementations must:
/// - write every column of the batch under its field name
/// - return columns in `projection` order (all columns if `None`)
/// - report a missing file as `GraphError::NotFound`
pub trait ColumnarCodec: Send + Sync {
    /// Write a batch, replacing any existing file
    fn write_batch(&self, path: &Path, batch: &RecordBatch) -> GraphResult<()>;

    /// Read a file written with `schema`
    ///
    /// # Arguments
    /// * `path` - Chunk file
    /// * `schema` - Full schema of the file
    /// * `projection` - Column indices into `schema` to load
    fn read_batch(
        &self,
        path: &Path,
        schema: &SchemaRef,
        projection: Option<&[usize]>,
    ) -> GraphResult<RecordBatch>;

    /// Number of rows without decoding columns where the format allows
    fn row_count(&self, path: &Path, schema: &SchemaRef) -> GraphResult<usize>;
}

static PARQUET: ParquetCodec = ParquetCodec;
static CSV: CsvCodec = CsvCodec;
static JSON: JsonCodec = JsonCodec;

/// Codec for a file type
///
/// # Returns
/// * `Err(GraphError::Unsupported)` for ORC
pub fn codec_for(file_type: FileType) -> GraphResult<&'static dyn ColumnarCodec> {
    match file_type {
        FileType::Parquet => Ok(&PARQUET),
        FileType::Csv => Ok(&CSV),
        FileType::Json => Ok(&JSON),
        FileType::Orc => Err(GraphError::Unsupported(
            "orc chunk files are not readable or writable".to_string(),
        )),
    }
}

/// Open a chunk file, mapping absence to `NotFound`
pub(crate) fn open_chunk(path: &Path) -> GraphResult<File> {
    match File::open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(GraphError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
