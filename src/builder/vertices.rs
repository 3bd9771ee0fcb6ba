use super::{group_columns, validate_properties, ValidateLevel};
use crate::config::BuilderConfig;
use crate::error::{GraphError, GraphResult};
use crate::info::VertexInfo;
use crate::storage::ChunkStore;
use crate::types::{IdType, Vertex};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Stages vertices and writes them as chunk files
///
/// Ids are assigned densely from `start_index`. After a `dump` the complete
/// chunks leave the staging buffer; a partial trailing chunk stays so that
/// the next `dump` rewrites it together with the rows appended since.
pub struct VerticesBuilder {
    vertex_info: Arc<VertexInfo>,
    store: ChunkStore,
    /// Id of the first staged vertex, always chunk aligned
    start_index: IdType,
    staged: Vec<Vertex>,
    validate_level: ValidateLevel,
}

impl VerticesBuilder {
    /// Create a builder writing under `path_prefix`
    ///
    /// # Returns
    /// * `Err(GraphError::InvalidArgument)` if `start_index` is negative or
    ///   not a multiple of the chunk size
    pub fn new(
        vertex_info: impl Into<Arc<VertexInfo>>,
        path_prefix: impl AsRef<Path>,
        start_index: IdType,
    ) -> GraphResult<Self> {
        let vertex_info = vertex_info.into();
        if start_index < 0 || start_index % vertex_info.chunk_size() != 0 {
            return Err(GraphError::invalid(format!(
                "start index {} is not a non-negative multiple of chunk size {}",
                start_index,
                vertex_info.chunk_size()
            )));
        }
        let store = ChunkStore::new(path_prefix, vertex_info.version())?;
        Ok(Self {
            vertex_info,
            store,
            start_index,
            staged: Vec::new(),
            validate_level: ValidateLevel::default(),
        })
    }

    pub fn from_config(
        vertex_info: impl Into<Arc<VertexInfo>>,
        path_prefix: impl AsRef<Path>,
        start_index: IdType,
        config: &BuilderConfig,
    ) -> GraphResult<Self> {
        let mut builder = Self::new(vertex_info, path_prefix, start_index)?;
        builder.set_validate_level(config.validate_level);
        Ok(builder)
    }

    pub fn set_validate_level(&mut self, level: ValidateLevel) {
        self.validate_level = level;
    }

    pub fn validate_level(&self) -> ValidateLevel {
        self.validate_level
    }

    pub fn vertex_info(&self) -> &Arc<VertexInfo> {
        &self.vertex_info
    }

    /// Number of staged vertices, including a retained partial chunk
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Id the next added vertex will receive
    pub fn next_index(&self) -> IdType {
        self.start_index + self.staged.len() as IdType
    }

    /// Drop every staged vertex
    ///
    /// Ids restart at the first id of the retained partial chunk, if any.
    pub fn clear(&mut self) {
        self.staged.clear();
    }

    /// Stage a vertex and return its id
    pub fn add_vertex(&mut self, vertex: Vertex) -> GraphResult<IdType> {
        self.validate(&vertex)?;
        let id = self.next_index();
        self.staged.push(vertex);
        Ok(id)
    }

    fn validate(&self, vertex: &Vertex) -> GraphResult<()> {
        if self.validate_level == ValidateLevel::None {
            return Ok(());
        }
        for label in vertex.labels() {
            if !self.vertex_info.has_label(label) {
                return Err(GraphError::invalid(format!(
                    "label '{}' is not declared by vertex type '{}'",
                    label,
                    self.vertex_info.type_name()
                )));
            }
        }
        validate_properties(
            self.vertex_info.property_groups(),
            vertex.properties(),
            self.validate_level,
        )
    }

    /// Write every staged vertex in ascending chunk order
    pub fn dump(&mut self) -> GraphResult<()> {
        if self.staged.is_empty() {
            return Ok(());
        }
        let info = &self.vertex_info;
        let chunk_size = info.chunk_size();
        let first_chunk = self.start_index / chunk_size;

        for (i, rows) in self.staged.chunks(chunk_size as usize).enumerate() {
            let chunk = first_chunk + i as IdType;
            for group in info.property_groups() {
                let columns = group_columns(group, rows.iter().map(|v| v.properties()))?;
                self.store.write_vertex_group(info, group, chunk, columns)?;
            }
            if !info.labels().is_empty() {
                let labels: Vec<&BTreeSet<String>> = rows.iter().map(|v| v.labels()).collect();
                self.store.write_vertex_labels(info, chunk, &labels)?;
            }
            debug!(
                vertex_type = info.type_name(),
                chunk,
                rows = rows.len(),
                "dumped vertex chunk"
            );
        }

        let written = self.staged.len();
        let complete = written - written % chunk_size as usize;
        self.staged.drain(..complete);
        self.start_index += complete as IdType;
        info!(
            vertex_type = self.vertex_info.type_name(),
            vertices = written,
            next_index = self.next_index(),
            "vertices dumped"
        );
        Ok(())
    }
}
