//! Chunk file naming, resolved once per `InfoVersion`
//!
//! Layout v1 (all paths relative to the graph prefix):
//! - Vertex group:   {vertex}/{group}/chunk{n}
//! - Vertex labels:  {vertex}/labels/chunk{n}
//! - Adjacency:      {edge}/{adj}/adj_list/part{v}/chunk{e}
//! - Offsets:        {edge}/{adj}/offset/chunk{v}
//! - Edge group:     {edge}/{adj}/{group}/part{v}/chunk{e}
//! - Edge count:     {edge}/{adj}/edge_count{v}
//! - Vertex count:   {edge}/{adj}/vertex_count

use crate::error::{GraphError, GraphResult};
use crate::info::{AdjacentList, EdgeInfo, InfoVersion, PropertyGroup, VertexInfo};
use crate::types::IdType;
use std::path::{Path, PathBuf};

pub const SRC_INDEX_COL: &str = "_graphArSrcIndex";
pub const DST_INDEX_COL: &str = "_graphArDstIndex";
pub const OFFSET_COL: &str = "_graphArOffset";

const CHUNK: &str = "chunk";
const PART: &str = "part";
const LABELS_DIR: &str = "labels";
const ADJ_LIST_DIR: &str = "adj_list";
const OFFSET_DIR: &str = "offset";

/// Directory names the layout writes next to property group directories
pub const RESERVED_DIRS: [&str; 3] = [LABELS_DIR, ADJ_LIST_DIR, OFFSET_DIR];
const EDGE_COUNT: &str = "edge_count";
const VERTEX_COUNT: &str = "vertex_count";

/// File-naming strategy of one format version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkLayout {
    V1,
}

impl ChunkLayout {
    pub fn for_version(version: InfoVersion) -> GraphResult<Self> {
        match version.version() {
            1 => Ok(ChunkLayout::V1),
            other => Err(GraphError::Unsupported(format!(
                "no chunk layout for version {}",
                other
            ))),
        }
    }

    pub fn vertex_group_dir(&self, root: &Path, vertex: &VertexInfo, group: &PropertyGroup) -> PathBuf {
        match self {
            ChunkLayout::V1 => root.join(vertex.prefix()).join(group.prefix()),
        }
    }

    pub fn vertex_chunk(
        &self,
        root: &Path,
        vertex: &VertexInfo,
        group: &PropertyGroup,
        chunk: IdType,
    ) -> PathBuf {
        self.chunk_in(&self.vertex_group_dir(root, vertex, group), chunk)
    }

    pub fn vertex_label_dir(&self, root: &Path, vertex: &VertexInfo) -> PathBuf {
        match self {
            ChunkLayout::V1 => root.join(vertex.prefix()).join(LABELS_DIR),
        }
    }

    pub fn vertex_label_chunk(&self, root: &Path, vertex: &VertexInfo, chunk: IdType) -> PathBuf {
        self.chunk_in(&self.vertex_label_dir(root, vertex), chunk)
    }

    /// Directory holding everything of one adjacency representation
    pub fn adj_list_dir(&self, root: &Path, edge: &EdgeInfo, adj: &AdjacentList) -> PathBuf {
        match self {
            ChunkLayout::V1 => root.join(edge.prefix()).join(adj.prefix()),
        }
    }

    pub fn adjacency_part_dir(
        &self,
        root: &Path,
        edge: &EdgeInfo,
        adj: &AdjacentList,
        vertex_chunk: IdType,
    ) -> PathBuf {
        self.adj_list_dir(root, edge, adj)
            .join(ADJ_LIST_DIR)
            .join(format!("{}{}", PART, vertex_chunk))
    }

    pub fn adjacency_chunk(
        &self,
        root: &Path,
        edge: &EdgeInfo,
        adj: &AdjacentList,
        vertex_chunk: IdType,
        edge_chunk: IdType,
    ) -> PathBuf {
        self.adjacency_part_dir(root, edge, adj, vertex_chunk)
            .join(format!("{}{}", CHUNK, edge_chunk))
    }

    pub fn offset_chunk(
        &self,
        root: &Path,
        edge: &EdgeInfo,
        adj: &AdjacentList,
        vertex_chunk: IdType,
    ) -> PathBuf {
        self.adj_list_dir(root, edge, adj)
            .join(OFFSET_DIR)
            .join(format!("{}{}", CHUNK, vertex_chunk))
    }

    pub fn edge_group_chunk(
        &self,
        root: &Path,
        edge: &EdgeInfo,
        adj: &AdjacentList,
        group: &PropertyGroup,
        vertex_chunk: IdType,
        edge_chunk: IdType,
    ) -> PathBuf {
        self.adj_list_dir(root, edge, adj)
            .join(group.prefix())
            .join(format!("{}{}", PART, vertex_chunk))
            .join(format!("{}{}", CHUNK, edge_chunk))
    }

    pub fn edge_count_file(
        &self,
        root: &Path,
        edge: &EdgeInfo,
        adj: &AdjacentList,
        vertex_chunk: IdType,
    ) -> PathBuf {
        self.adj_list_dir(root, edge, adj)
            .join(format!("{}{}", EDGE_COUNT, vertex_chunk))
    }

    pub fn vertex_count_file(&self, root: &Path, edge: &EdgeInfo, adj: &AdjacentList) -> PathBuf {
        self.adj_list_dir(root, edge, adj).join(VERTEX_COUNT)
    }

    /// Chunk file `n` inside a chunk directory
    pub fn chunk_in(&self, dir: &Path, chunk: IdType) -> PathBuf {
        match self {
            ChunkLayout::V1 => dir.join(format!("{}{}", CHUNK, chunk)),
        }
    }

    /// Chunk index encoded in a `chunk<n>` file name
    pub fn parse_chunk_index(&self, file_name: &str) -> Option<IdType> {
        file_name
            .strip_prefix(CHUNK)
            .and_then(|n| n.parse::<IdType>().ok())
            .filter(|n| *n >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{AdjListType, DataType, FileType, Property};

    fn fixtures() -> (VertexInfo, EdgeInfo, PropertyGroup) {
        let group = PropertyGroup::new(
            vec![Property::simple("age", DataType::Int32, false)],
            FileType::Parquet,
            "",
        )
        .unwrap();
        let vertex = VertexInfo::new(
            "person",
            2,
            vec![group.clone()],
            vec![],
            "",
            InfoVersion::default(),
        )
        .unwrap();
        let edge = EdgeInfo::new(
            "person",
            "knows",
            "person",
            4,
            2,
            2,
            true,
            vec![AdjacentList::new(
                AdjListType::OrderedBySource,
                FileType::Parquet,
                "",
            )],
            vec![],
            "",
            InfoVersion::default(),
        )
        .unwrap();
        (vertex, edge, group)
    }

    #[test]
    fn test_vertex_paths() {
        let (vertex, _, group) = fixtures();
        let layout = ChunkLayout::for_version(InfoVersion::default()).unwrap();
        let root = Path::new("/data/");
        assert_eq!(
            layout.vertex_chunk(root, &vertex, &group, 3),
            PathBuf::from("/data/person/age/chunk3")
        );
        assert_eq!(
            layout.vertex_label_chunk(root, &vertex, 0),
            PathBuf::from("/data/person/labels/chunk0")
        );
    }

    #[test]
    fn test_edge_paths() {
        let (_, edge, group) = fixtures();
        let layout = ChunkLayout::V1;
        let adj = edge.adjacent_list(AdjListType::OrderedBySource).unwrap();
        let root = Path::new("/data");
        assert_eq!(
            layout.adjacency_chunk(root, &edge, adj, 1, 2),
            PathBuf::from("/data/person_knows_person/ordered_by_source/adj_list/part1/chunk2")
        );
        assert_eq!(
            layout.offset_chunk(root, &edge, adj, 1),
            PathBuf::from("/data/person_knows_person/ordered_by_source/offset/chunk1")
        );
        assert_eq!(
            layout.edge_group_chunk(root, &edge, adj, &group, 0, 0),
            PathBuf::from("/data/person_knows_person/ordered_by_source/age/part0/chunk0")
        );
        assert_eq!(
            layout.edge_count_file(root, &edge, adj, 5),
            PathBuf::from("/data/person_knows_person/ordered_by_source/edge_count5")
        );
    }

    #[test]
    fn test_parse_chunk_index() {
        let layout = ChunkLayout::V1;
        assert_eq!(layout.parse_chunk_index("chunk12"), Some(12));
        assert_eq!(layout.parse_chunk_index("chunkx"), None);
        assert_eq!(layout.parse_chunk_index("part1"), None);
    }

    #[test]
    fn test_chunk_in_matches_parse() {
        let layout = ChunkLayout::V1;
        let path = layout.chunk_in(Path::new("/data/person/age"), 7);
        let name = path.file_name().and_then(|n| n.to_str()).unwrap();
        assert_eq!(layout.parse_chunk_index(name), Some(7));
        let (vertex, _, group) = fixtures();
        assert_eq!(
            layout.vertex_chunk(Path::new("/data"), &vertex, &group, 7),
            path
        );
    }
}
