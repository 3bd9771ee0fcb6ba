use super::arrow_convert::{flag_values, group_schema, id_array, id_values};
use super::layout::{ChunkLayout, DST_INDEX_COL, OFFSET_COL, SRC_INDEX_COL};
use super::codec_for;
use crate::error::{GraphError, GraphResult};
use crate::info::{
    AdjListType, AdjacentList, EdgeInfo, FileType, GraphInfo, InfoVersion, PropertyGroup,
    VertexInfo,
};
use crate::types::IdType;
use arrow::array::{ArrayRef, BooleanArray};
use arrow::datatypes::{DataType as ArrowDataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// Typed chunk I/O rooted at a graph prefix
///
/// Every write replaces the whole file; parent directories are created on
/// demand.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    root: PathBuf,
    layout: ChunkLayout,
}

impl ChunkStore {
    pub fn new(root: impl AsRef<Path>, version: InfoVersion) -> GraphResult<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            layout: ChunkLayout::for_version(version)?,
        })
    }

    pub fn for_graph(graph: &GraphInfo) -> GraphResult<Self> {
        Self::new(graph.prefix(), graph.version())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    fn write(&self, path: &Path, file_type: FileType, batch: &RecordBatch) -> GraphResult<()> {
        let codec = codec_for(file_type)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        codec.write_batch(path, batch)?;
        trace!(path = %path.display(), rows = batch.num_rows(), "wrote chunk");
        Ok(())
    }

    fn read(
        &self,
        path: &Path,
        file_type: FileType,
        schema: &SchemaRef,
        projection: Option<&[usize]>,
    ) -> GraphResult<RecordBatch> {
        codec_for(file_type)?.read_batch(path, schema, projection)
    }

    // ----- vertices -----

    /// Write one chunk of a vertex property group, columns in group order
    pub fn write_vertex_group(
        &self,
        vertex: &VertexInfo,
        group: &PropertyGroup,
        chunk: IdType,
        columns: Vec<ArrayRef>,
    ) -> GraphResult<()> {
        let batch = RecordBatch::try_new(group_schema(group)?, columns)?;
        let path = self.layout.vertex_chunk(&self.root, vertex, group, chunk);
        self.write(&path, group.file_type(), &batch)
    }

    pub fn read_vertex_group(
        &self,
        vertex: &VertexInfo,
        group: &PropertyGroup,
        chunk: IdType,
    ) -> GraphResult<RecordBatch> {
        let path = self.layout.vertex_chunk(&self.root, vertex, group, chunk);
        self.read(&path, group.file_type(), &group_schema(group)?, None)
    }

    /// Read a single property column of one vertex chunk
    pub fn read_vertex_column(
        &self,
        vertex: &VertexInfo,
        group: &PropertyGroup,
        property: &str,
        chunk: IdType,
    ) -> GraphResult<ArrayRef> {
        let index = group
            .column_index(property)
            .ok_or_else(|| GraphError::UnknownProperty(property.to_string()))?;
        let path = self.layout.vertex_chunk(&self.root, vertex, group, chunk);
        let batch = self.read(&path, group.file_type(), &group_schema(group)?, Some(&[index]))?;
        Ok(batch.column(0).clone())
    }

    fn label_file_type(vertex: &VertexInfo) -> FileType {
        vertex
            .property_group_by_index(0)
            .map(|g| g.file_type())
            .unwrap_or(FileType::Parquet)
    }

    fn label_schema(vertex: &VertexInfo) -> SchemaRef {
        let fields: Vec<Field> = vertex
            .labels()
            .iter()
            .map(|label| Field::new(label, ArrowDataType::Boolean, false))
            .collect();
        Arc::new(Schema::new(fields))
    }

    /// Write the label chunk, one bool column per declared label
    pub fn write_vertex_labels(
        &self,
        vertex: &VertexInfo,
        chunk: IdType,
        rows: &[&BTreeSet<String>],
    ) -> GraphResult<()> {
        let columns: Vec<ArrayRef> = vertex
            .labels()
            .iter()
            .map(|label| {
                let flags: Vec<bool> = rows.iter().map(|set| set.contains(label)).collect();
                Arc::new(BooleanArray::from(flags)) as ArrayRef
            })
            .collect();
        let batch = RecordBatch::try_new(Self::label_schema(vertex), columns)?;
        let path = self.layout.vertex_label_chunk(&self.root, vertex, chunk);
        self.write(&path, Self::label_file_type(vertex), &batch)
    }

    /// The whole label chunk, one bool column per declared label
    pub fn read_vertex_label_batch(&self, vertex: &VertexInfo, chunk: IdType) -> GraphResult<RecordBatch> {
        let path = self.layout.vertex_label_chunk(&self.root, vertex, chunk);
        self.read(
            &path,
            Self::label_file_type(vertex),
            &Self::label_schema(vertex),
            None,
        )
    }

    /// Membership flags of the requested labels, one vector per label
    ///
    /// # Returns
    /// * `Err(GraphError::InvalidArgument)` if a label is not declared
    pub fn read_vertex_labels(
        &self,
        vertex: &VertexInfo,
        chunk: IdType,
        labels: &[String],
    ) -> GraphResult<Vec<Vec<bool>>> {
        let projection = labels
            .iter()
            .map(|label| {
                vertex
                    .labels()
                    .iter()
                    .position(|l| l == label)
                    .ok_or_else(|| {
                        GraphError::invalid(format!(
                            "label '{}' is not declared by vertex type '{}'",
                            label,
                            vertex.type_name()
                        ))
                    })
            })
            .collect::<GraphResult<Vec<_>>>()?;
        let path = self.layout.vertex_label_chunk(&self.root, vertex, chunk);
        let batch = self.read(
            &path,
            Self::label_file_type(vertex),
            &Self::label_schema(vertex),
            Some(&projection),
        )?;
        batch
            .columns()
            .iter()
            .map(|c| flag_values(c.as_ref()))
            .collect()
    }

    /// Number of vertices stored for a type
    ///
    /// Derived from the chunk files of the first property group (the label
    /// chunks when there are no groups): the highest chunk index times the
    /// chunk size plus the rows of that last chunk. A type with no files
    /// has zero vertices.
    pub fn vertex_num(&self, vertex: &VertexInfo) -> GraphResult<IdType> {
        let (dir, file_type, schema) = match vertex.property_group_by_index(0) {
            Some(group) => (
                self.layout.vertex_group_dir(&self.root, vertex, group),
                group.file_type(),
                group_schema(group)?,
            ),
            None if !vertex.labels().is_empty() => (
                self.layout.vertex_label_dir(&self.root, vertex),
                Self::label_file_type(vertex),
                Self::label_schema(vertex),
            ),
            None => return Ok(0),
        };

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut last: Option<IdType> = None;
        for entry in entries {
            let entry = entry?;
            let index = entry
                .file_name()
                .to_str()
                .and_then(|name| self.layout.parse_chunk_index(name));
            if index.is_some() {
                last = last.max(index);
            }
        }

        match last {
            None => Ok(0),
            Some(last) => {
                let path = self.layout.chunk_in(&dir, last);
                let rows = codec_for(file_type)?.row_count(&path, &schema)?;
                Ok(last * vertex.chunk_size() + rows as IdType)
            }
        }
    }

    // ----- edges -----

    fn adjacent_list<'a>(edge: &'a EdgeInfo, adj_type: AdjListType) -> GraphResult<&'a AdjacentList> {
        edge.adjacent_list(adj_type).ok_or_else(|| {
            GraphError::invalid(format!(
                "edge type '{}' has no {} adjacency list",
                edge.concat_key(),
                adj_type
            ))
        })
    }

    fn adjacency_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new(SRC_INDEX_COL, ArrowDataType::Int64, false),
            Field::new(DST_INDEX_COL, ArrowDataType::Int64, false),
        ]))
    }

    fn offset_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![Field::new(
            OFFSET_COL,
            ArrowDataType::Int64,
            false,
        )]))
    }

    /// Write one edge chunk of `(src, dst)` pairs
    pub fn write_adjacency(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        vertex_chunk: IdType,
        edge_chunk: IdType,
        src: &[IdType],
        dst: &[IdType],
    ) -> GraphResult<()> {
        if src.len() != dst.len() {
            return Err(GraphError::invalid(format!(
                "adjacency columns differ in length: {} sources, {} destinations",
                src.len(),
                dst.len()
            )));
        }
        let adj = Self::adjacent_list(edge, adj_type)?;
        let batch = RecordBatch::try_new(Self::adjacency_schema(), vec![id_array(src), id_array(dst)])?;
        let path = self
            .layout
            .adjacency_chunk(&self.root, edge, adj, vertex_chunk, edge_chunk);
        self.write(&path, adj.file_type(), &batch)
    }

    /// Read one edge chunk as a two-column batch
    pub fn read_adjacency_batch(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        vertex_chunk: IdType,
        edge_chunk: IdType,
    ) -> GraphResult<RecordBatch> {
        let adj = Self::adjacent_list(edge, adj_type)?;
        let path = self
            .layout
            .adjacency_chunk(&self.root, edge, adj, vertex_chunk, edge_chunk);
        self.read(&path, adj.file_type(), &Self::adjacency_schema(), None)
    }

    /// Read one edge chunk as `(sources, destinations)`
    pub fn read_adjacency(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        vertex_chunk: IdType,
        edge_chunk: IdType,
    ) -> GraphResult<(Vec<IdType>, Vec<IdType>)> {
        let batch = self.read_adjacency_batch(edge, adj_type, vertex_chunk, edge_chunk)?;
        Ok((
            id_values(batch.column(0).as_ref())?,
            id_values(batch.column(1).as_ref())?,
        ))
    }

    /// Write the offsets of one vertex chunk
    ///
    /// `offsets[i+1] - offsets[i]` is the degree of vertex `i` of the chunk;
    /// the array must be non-decreasing.
    pub fn write_offsets(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        vertex_chunk: IdType,
        offsets: &[IdType],
    ) -> GraphResult<()> {
        if !adj_type.is_ordered() {
            return Err(GraphError::invalid(format!(
                "{} adjacency lists carry no offsets",
                adj_type
            )));
        }
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(GraphError::invalid("offsets must be non-decreasing"));
        }
        let adj = Self::adjacent_list(edge, adj_type)?;
        let batch = RecordBatch::try_new(Self::offset_schema(), vec![id_array(offsets)])?;
        let path = self.layout.offset_chunk(&self.root, edge, adj, vertex_chunk);
        self.write(&path, adj.file_type(), &batch)
    }

    pub fn read_offsets(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        vertex_chunk: IdType,
    ) -> GraphResult<Vec<IdType>> {
        let adj = Self::adjacent_list(edge, adj_type)?;
        let path = self.layout.offset_chunk(&self.root, edge, adj, vertex_chunk);
        let batch = self.read(&path, adj.file_type(), &Self::offset_schema(), None)?;
        id_values(batch.column(0).as_ref())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn write_edge_group(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        group: &PropertyGroup,
        vertex_chunk: IdType,
        edge_chunk: IdType,
        columns: Vec<ArrayRef>,
    ) -> GraphResult<()> {
        let adj = Self::adjacent_list(edge, adj_type)?;
        let batch = RecordBatch::try_new(group_schema(group)?, columns)?;
        let path = self
            .layout
            .edge_group_chunk(&self.root, edge, adj, group, vertex_chunk, edge_chunk);
        self.write(&path, group.file_type(), &batch)
    }

    pub fn read_edge_group(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        group: &PropertyGroup,
        vertex_chunk: IdType,
        edge_chunk: IdType,
    ) -> GraphResult<RecordBatch> {
        let adj = Self::adjacent_list(edge, adj_type)?;
        let path = self
            .layout
            .edge_group_chunk(&self.root, edge, adj, group, vertex_chunk, edge_chunk);
        self.read(&path, group.file_type(), &group_schema(group)?, None)
    }

    fn write_count(&self, path: &Path, count: IdType) -> GraphResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, count.to_le_bytes())?;
        Ok(())
    }

    fn read_count(&self, path: &Path) -> GraphResult<IdType> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GraphError::NotFound(path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} holds {} bytes, expected 8", path.display(), bytes.len()),
            )
        })?;
        Ok(IdType::from_le_bytes(raw))
    }

    /// Number of edges in one vertex chunk's part
    pub fn write_edge_count(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        vertex_chunk: IdType,
        count: IdType,
    ) -> GraphResult<()> {
        let adj = Self::adjacent_list(edge, adj_type)?;
        let path = self
            .layout
            .edge_count_file(&self.root, edge, adj, vertex_chunk);
        self.write_count(&path, count)
    }

    pub fn read_edge_count(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        vertex_chunk: IdType,
    ) -> GraphResult<IdType> {
        let adj = Self::adjacent_list(edge, adj_type)?;
        let path = self
            .layout
            .edge_count_file(&self.root, edge, adj, vertex_chunk);
        self.read_count(&path)
    }

    /// Number of vertices of the aligned endpoint type
    pub fn write_vertex_count(
        &self,
        edge: &EdgeInfo,
        adj_type: AdjListType,
        count: IdType,
    ) -> GraphResult<()> {
        let adj = Self::adjacent_list(edge, adj_type)?;
        let path = self.layout.vertex_count_file(&self.root, edge, adj);
        self.write_count(&path, count)
    }

    pub fn read_vertex_count(&self, edge: &EdgeInfo, adj_type: AdjListType) -> GraphResult<IdType> {
        let adj = Self::adjacent_list(edge, adj_type)?;
        let path = self.layout.vertex_count_file(&self.root, edge, adj);
        self.read_count(&path)
    }
}
