use super::{group_columns, validate_properties, ValidateLevel};
use crate::config::BuilderConfig;
use crate::error::{GraphError, GraphResult};
use crate::info::{AdjListType, AlignedBy, EdgeInfo};
use crate::storage::ChunkStore;
use crate::types::{chunk_count, chunk_len, Edge, IdType};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Stages edges and writes every requested adjacency representation
///
/// For each representation the edges are partitioned by the vertex chunk of
/// the aligned endpoint (one "part" per vertex chunk), sorted by that
/// endpoint for ordered lists, and split into edge chunks of the edge
/// type's chunk size. Every `dump` rewrites the full accumulated edge set.
pub struct EdgesBuilder {
    edge_info: Arc<EdgeInfo>,
    store: ChunkStore,
    adj_types: Vec<AdjListType>,
    src_num: Option<IdType>,
    dst_num: Option<IdType>,
    edges: Vec<Edge>,
    validate_level: ValidateLevel,
}

impl EdgesBuilder {
    /// Builder for every adjacency list the edge type declares
    ///
    /// # Arguments
    /// * `src_num` - Number of source vertices
    /// * `dst_num` - Number of destination vertices
    pub fn new(
        edge_info: impl Into<Arc<EdgeInfo>>,
        path_prefix: impl AsRef<Path>,
        src_num: IdType,
        dst_num: IdType,
    ) -> GraphResult<Self> {
        let edge_info = edge_info.into();
        if src_num < 0 || dst_num < 0 {
            return Err(GraphError::invalid(format!(
                "vertex counts must be non-negative, got {} and {}",
                src_num, dst_num
            )));
        }
        let adj_types = edge_info
            .adjacent_lists()
            .iter()
            .map(|adj| adj.adj_type())
            .collect();
        let store = ChunkStore::new(path_prefix, edge_info.version())?;
        Ok(Self {
            edge_info,
            store,
            adj_types,
            src_num: Some(src_num),
            dst_num: Some(dst_num),
            edges: Vec::new(),
            validate_level: ValidateLevel::default(),
        })
    }

    /// Builder for a single adjacency list
    ///
    /// # Arguments
    /// * `vertices_num` - Number of vertices of the endpoint the list is
    ///   aligned by
    ///
    /// # Returns
    /// * `Err(GraphError::InvalidArgument)` if the edge type lacks `adj_type`
    pub fn for_adj_list(
        edge_info: impl Into<Arc<EdgeInfo>>,
        path_prefix: impl AsRef<Path>,
        adj_type: AdjListType,
        vertices_num: IdType,
    ) -> GraphResult<Self> {
        let edge_info = edge_info.into();
        if !edge_info.has_adjacent_list_type(adj_type) {
            return Err(GraphError::invalid(format!(
                "edge type '{}' has no {} adjacency list",
                edge_info.concat_key(),
                adj_type
            )));
        }
        if vertices_num < 0 {
            return Err(GraphError::invalid(format!(
                "vertex count must be non-negative, got {}",
                vertices_num
            )));
        }
        let (src_num, dst_num) = match adj_type.aligned_by() {
            AlignedBy::Src => (Some(vertices_num), None),
            AlignedBy::Dst => (None, Some(vertices_num)),
        };
        let store = ChunkStore::new(path_prefix, edge_info.version())?;
        Ok(Self {
            edge_info,
            store,
            adj_types: vec![adj_type],
            src_num,
            dst_num,
            edges: Vec::new(),
            validate_level: ValidateLevel::default(),
        })
    }

    pub fn from_config(
        edge_info: impl Into<Arc<EdgeInfo>>,
        path_prefix: impl AsRef<Path>,
        src_num: IdType,
        dst_num: IdType,
        config: &BuilderConfig,
    ) -> GraphResult<Self> {
        let mut builder = Self::new(edge_info, path_prefix, src_num, dst_num)?;
        builder.set_validate_level(config.validate_level);
        Ok(builder)
    }

    pub fn set_validate_level(&mut self, level: ValidateLevel) {
        self.validate_level = level;
    }

    pub fn edge_info(&self) -> &Arc<EdgeInfo> {
        &self.edge_info
    }

    pub fn adj_list_types(&self) -> &[AdjListType] {
        &self.adj_types
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    fn check_id(id: IdType, limit: Option<IdType>, endpoint: &str) -> GraphResult<()> {
        let in_range = id >= 0 && limit.map_or(true, |n| id < n);
        if !in_range {
            return Err(GraphError::invalid(format!(
                "{} id {} out of range for {} vertices",
                endpoint,
                id,
                limit.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
            )));
        }
        Ok(())
    }

    /// Stage an edge
    pub fn add_edge(&mut self, edge: Edge) -> GraphResult<()> {
        Self::check_id(edge.src, self.src_num, "source")?;
        Self::check_id(edge.dst, self.dst_num, "destination")?;
        validate_properties(
            self.edge_info.property_groups(),
            edge.properties(),
            self.validate_level,
        )?;
        self.edges.push(edge);
        Ok(())
    }

    /// Write every adjacency representation of the staged edges
    pub fn dump(&mut self) -> GraphResult<()> {
        for adj_type in self.adj_types.clone() {
            self.dump_adj_list(adj_type)?;
        }
        info!(
            edge_type = %self.edge_info.concat_key(),
            edges = self.edges.len(),
            adj_lists = self.adj_types.len(),
            "edges dumped"
        );
        Ok(())
    }

    fn dump_adj_list(&self, adj_type: AdjListType) -> GraphResult<()> {
        let info = &self.edge_info;
        let aligned_by = adj_type.aligned_by();
        let vertex_chunk_size = info.aligned_chunk_size(adj_type);
        let endpoint = |e: &Edge| match aligned_by {
            AlignedBy::Src => e.src,
            AlignedBy::Dst => e.dst,
        };
        let vertices_num = match aligned_by {
            AlignedBy::Src => self.src_num,
            AlignedBy::Dst => self.dst_num,
        }
        .unwrap_or_else(|| self.edges.iter().map(|e| endpoint(e) + 1).max().unwrap_or(0));

        let mut parts: Vec<Vec<&Edge>> =
            vec![Vec::new(); chunk_count(vertices_num, vertex_chunk_size) as usize];
        for edge in &self.edges {
            parts[(endpoint(edge) / vertex_chunk_size) as usize].push(edge);
        }

        for (part, edges) in parts.iter_mut().enumerate() {
            let part = part as IdType;
            if adj_type.is_ordered() {
                edges.sort_by_key(|e| endpoint(*e));
            }

            for (edge_chunk, rows) in edges.chunks(info.chunk_size() as usize).enumerate() {
                let edge_chunk = edge_chunk as IdType;
                let src: Vec<IdType> = rows.iter().map(|e| e.src).collect();
                let dst: Vec<IdType> = rows.iter().map(|e| e.dst).collect();
                self.store
                    .write_adjacency(info, adj_type, part, edge_chunk, &src, &dst)?;
                for group in info.property_groups() {
                    let columns = group_columns(group, rows.iter().map(|e| e.properties()))?;
                    self.store
                        .write_edge_group(info, adj_type, group, part, edge_chunk, columns)?;
                }
            }

            if adj_type.is_ordered() {
                let first = part * vertex_chunk_size;
                let len = chunk_len(vertices_num, vertex_chunk_size, part) as usize;
                let mut offsets = vec![0 as IdType; len + 1];
                for edge in edges.iter() {
                    offsets[(endpoint(*edge) - first) as usize + 1] += 1;
                }
                for i in 1..offsets.len() {
                    offsets[i] += offsets[i - 1];
                }
                self.store.write_offsets(info, adj_type, part, &offsets)?;
            }

            self.store
                .write_edge_count(info, adj_type, part, edges.len() as IdType)?;
            debug!(
                edge_type = %info.concat_key(),
                adj_list = %adj_type,
                part,
                edges = edges.len(),
                "dumped adjacency part"
            );
        }

        self.store.write_vertex_count(info, adj_type, vertices_num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{AdjacentList, DataType, FileType, InfoVersion, Property, PropertyGroup};
    use crate::storage::arrow_convert::column_values;
    use crate::types::Value;
    use tempfile::TempDir;

    fn knows(adj_types: &[AdjListType]) -> EdgeInfo {
        let weight = PropertyGroup::new(
            vec![Property::simple("weight", DataType::Double, false)],
            FileType::Parquet,
            "",
        )
        .unwrap();
        EdgeInfo::new(
            "person",
            "knows",
            "person",
            2,
            2,
            2,
            true,
            adj_types
                .iter()
                .map(|t| AdjacentList::new(*t, FileType::Parquet, ""))
                .collect(),
            vec![weight],
            "",
            InfoVersion::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_ordered_by_source_layout() {
        let dir = TempDir::new().unwrap();
        let info = knows(&[AdjListType::OrderedBySource, AdjListType::UnorderedByDest]);
        let mut builder = EdgesBuilder::new(info.clone(), dir.path(), 3, 3).unwrap();
        for (src, dst, w) in [(2, 0, 0.5), (0, 1, 1.0), (0, 2, 2.0), (1, 2, 3.0)] {
            builder
                .add_edge(Edge::new(src, dst).with_property("weight", w))
                .unwrap();
        }
        builder.dump().unwrap();

        let store = ChunkStore::new(dir.path(), InfoVersion::default()).unwrap();
        let adj = AdjListType::OrderedBySource;
        // part 0 holds sources 0 and 1 sorted, part 1 holds source 2
        let (src, dst) = store.read_adjacency(&info, adj, 0, 0).unwrap();
        assert_eq!((src, dst), (vec![0, 0], vec![1, 2]));
        let (src, dst) = store.read_adjacency(&info, adj, 0, 1).unwrap();
        assert_eq!((src, dst), (vec![1], vec![2]));
        assert_eq!(store.read_offsets(&info, adj, 0).unwrap(), vec![0, 2, 3]);
        assert_eq!(store.read_offsets(&info, adj, 1).unwrap(), vec![0, 1]);
        assert_eq!(store.read_edge_count(&info, adj, 0).unwrap(), 3);
        assert_eq!(store.read_edge_count(&info, adj, 1).unwrap(), 1);
        assert_eq!(store.read_vertex_count(&info, adj).unwrap(), 3);

        let group = info.property_group_by_index(0).unwrap();
        let weights = store.read_edge_group(&info, adj, group, 1, 0).unwrap();
        assert_eq!(
            column_values(weights.column(0).as_ref()).unwrap(),
            vec![Value::Float64(0.5)]
        );

        // unordered by dest keeps insertion order within a part
        let (src, dst) = store
            .read_adjacency(&info, AdjListType::UnorderedByDest, 0, 0)
            .unwrap();
        assert_eq!((src, dst), (vec![2, 0], vec![0, 1]));
        assert!(store
            .read_offsets(&info, AdjListType::UnorderedByDest, 0)
            .is_err());
    }

    #[test]
    fn test_id_range_checked() {
        let dir = TempDir::new().unwrap();
        let mut builder = EdgesBuilder::new(
            knows(&[AdjListType::OrderedBySource]),
            dir.path(),
            2,
            2,
        )
        .unwrap();
        assert!(matches!(
            builder.add_edge(Edge::new(2, 0)),
            Err(GraphError::InvalidArgument(_))
        ));
        assert!(builder.add_edge(Edge::new(0, -1)).is_err());
        assert!(builder.add_edge(Edge::new(1, 1)).is_ok());
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_for_adj_list() {
        let dir = TempDir::new().unwrap();
        let info = knows(&[AdjListType::OrderedByDest]);
        assert!(matches!(
            EdgesBuilder::for_adj_list(info.clone(), dir.path(), AdjListType::OrderedBySource, 4),
            Err(GraphError::InvalidArgument(_))
        ));
        let mut builder =
            EdgesBuilder::for_adj_list(info.clone(), dir.path(), AdjListType::OrderedByDest, 4)
                .unwrap();
        // source side is unbounded
        builder.add_edge(Edge::new(100, 3)).unwrap();
        builder.dump().unwrap();

        let store = ChunkStore::new(dir.path(), InfoVersion::default()).unwrap();
        assert_eq!(
            store
                .read_offsets(&info, AdjListType::OrderedByDest, 1)
                .unwrap(),
            vec![0, 0, 1]
        );
        assert_eq!(
            store
                .read_edge_count(&info, AdjListType::OrderedByDest, 0)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_property_validation() {
        let dir = TempDir::new().unwrap();
        let mut builder = EdgesBuilder::new(
            knows(&[AdjListType::OrderedBySource]),
            dir.path(),
            2,
            2,
        )
        .unwrap();
        assert!(matches!(
            builder.add_edge(Edge::new(0, 1).with_property("weight", "heavy")),
            Err(GraphError::TypeMismatch { .. })
        ));
        assert!(matches!(
            builder.add_edge(Edge::new(0, 1).with_property("since", 2020)),
            Err(GraphError::UnknownProperty(_))
        ));
    }
}
