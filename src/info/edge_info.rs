use super::data_type::{DataType, FileType};
use super::descriptor::EdgeDescriptor;
use super::property::{check_unique_across_groups, Property, PropertyGroup};
use super::version::InfoVersion;
use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Physical neighbour-list representations an edge type may provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjListType {
    OrderedBySource,
    OrderedByDest,
    UnorderedBySource,
    UnorderedByDest,
}

/// Which endpoint partitions the adjacency list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignedBy {
    Src,
    Dst,
}

impl AdjListType {
    pub const ALL: [AdjListType; 4] = [
        AdjListType::OrderedBySource,
        AdjListType::OrderedByDest,
        AdjListType::UnorderedBySource,
        AdjListType::UnorderedByDest,
    ];

    pub fn from_parts(ordered: bool, aligned_by: AlignedBy) -> Self {
        match (ordered, aligned_by) {
            (true, AlignedBy::Src) => AdjListType::OrderedBySource,
            (true, AlignedBy::Dst) => AdjListType::OrderedByDest,
            (false, AlignedBy::Src) => AdjListType::UnorderedBySource,
            (false, AlignedBy::Dst) => AdjListType::UnorderedByDest,
        }
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self, AdjListType::OrderedBySource | AdjListType::OrderedByDest)
    }

    pub fn aligned_by(&self) -> AlignedBy {
        match self {
            AdjListType::OrderedBySource | AdjListType::UnorderedBySource => AlignedBy::Src,
            AdjListType::OrderedByDest | AdjListType::UnorderedByDest => AlignedBy::Dst,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdjListType::OrderedBySource => "ordered_by_source",
            AdjListType::OrderedByDest => "ordered_by_dest",
            AdjListType::UnorderedBySource => "unordered_by_source",
            AdjListType::UnorderedByDest => "unordered_by_dest",
        }
    }
}

impl fmt::Display for AdjListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for AlignedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignedBy::Src => write!(f, "src"),
            AlignedBy::Dst => write!(f, "dst"),
        }
    }
}

/// One adjacency representation of an edge type
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacentList {
    adj_type: AdjListType,
    file_type: FileType,
    prefix: String,
}

impl AdjacentList {
    /// An empty `prefix` defaults to `"<type name>/"`
    pub fn new(adj_type: AdjListType, file_type: FileType, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if prefix.is_empty() {
            prefix = format!("{}/", adj_type.name());
        }
        Self {
            adj_type,
            file_type,
            prefix,
        }
    }

    pub fn adj_type(&self) -> AdjListType {
        self.adj_type
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Schema and storage layout of one `(src, edge, dst)` triple
///
/// Endpoint types are held by name and resolved through the owning
/// `GraphInfo`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInfo {
    src_type: String,
    edge_type: String,
    dst_type: String,
    chunk_size: i64,
    src_chunk_size: i64,
    dst_chunk_size: i64,
    directed: bool,
    adjacent_lists: Vec<AdjacentList>,
    property_groups: Vec<PropertyGroup>,
    prefix: String,
    version: InfoVersion,
}

impl EdgeInfo {
    /// Create an edge info
    ///
    /// An empty `prefix` defaults to `"<src>_<edge>_<dst>/"`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        src_type: impl Into<String>,
        edge_type: impl Into<String>,
        dst_type: impl Into<String>,
        chunk_size: i64,
        src_chunk_size: i64,
        dst_chunk_size: i64,
        directed: bool,
        adjacent_lists: Vec<AdjacentList>,
        property_groups: Vec<PropertyGroup>,
        prefix: impl Into<String>,
        version: InfoVersion,
    ) -> GraphResult<Self> {
        let src_type = src_type.into();
        let edge_type = edge_type.into();
        let dst_type = dst_type.into();

        for (field, name) in [
            ("src_type", &src_type),
            ("edge_type", &edge_type),
            ("dst_type", &dst_type),
        ] {
            if name.is_empty() {
                return Err(GraphError::schema(field, "type name is empty"));
            }
        }
        for (field, size) in [
            ("chunk_size", chunk_size),
            ("src_chunk_size", src_chunk_size),
            ("dst_chunk_size", dst_chunk_size),
        ] {
            if size <= 0 {
                return Err(GraphError::schema(
                    field,
                    format!("must be positive, got {}", size),
                ));
            }
        }
        if adjacent_lists.is_empty() {
            return Err(GraphError::schema(
                "adj_lists",
                "an edge type needs at least one adjacency list",
            ));
        }
        for (i, adj) in adjacent_lists.iter().enumerate() {
            if adjacent_lists[..i]
                .iter()
                .any(|a| a.adj_type() == adj.adj_type())
            {
                return Err(GraphError::schema(
                    "adj_lists",
                    format!("duplicate adjacency list '{}'", adj.adj_type()),
                ));
            }
        }
        check_unique_across_groups(&property_groups)?;

        let mut prefix = prefix.into();
        if prefix.is_empty() {
            prefix = format!("{}_{}_{}/", src_type, edge_type, dst_type);
        }

        Ok(Self {
            src_type,
            edge_type,
            dst_type,
            chunk_size,
            src_chunk_size,
            dst_chunk_size,
            directed,
            adjacent_lists,
            property_groups,
            prefix,
            version,
        })
    }

    pub fn src_type(&self) -> &str {
        &self.src_type
    }

    pub fn edge_type(&self) -> &str {
        &self.edge_type
    }

    pub fn dst_type(&self) -> &str {
        &self.dst_type
    }

    /// `<src>_<edge>_<dst>`, used as descriptor file stem
    pub fn concat_key(&self) -> String {
        format!("{}_{}_{}", self.src_type, self.edge_type, self.dst_type)
    }

    pub fn chunk_size(&self) -> i64 {
        self.chunk_size
    }

    pub fn src_chunk_size(&self) -> i64 {
        self.src_chunk_size
    }

    pub fn dst_chunk_size(&self) -> i64 {
        self.dst_chunk_size
    }

    /// Vertex chunk size of the endpoint the list is aligned by
    pub fn aligned_chunk_size(&self, adj_type: AdjListType) -> i64 {
        match adj_type.aligned_by() {
            AlignedBy::Src => self.src_chunk_size,
            AlignedBy::Dst => self.dst_chunk_size,
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn version(&self) -> InfoVersion {
        self.version
    }

    pub fn adjacent_lists(&self) -> &[AdjacentList] {
        &self.adjacent_lists
    }

    pub fn has_adjacent_list_type(&self, adj_type: AdjListType) -> bool {
        self.adjacent_list(adj_type).is_some()
    }

    pub fn adjacent_list(&self, adj_type: AdjListType) -> Option<&AdjacentList> {
        self.adjacent_lists.iter().find(|a| a.adj_type() == adj_type)
    }

    pub fn property_groups(&self) -> &[PropertyGroup] {
        &self.property_groups
    }

    pub fn property_group_num(&self) -> usize {
        self.property_groups.len()
    }

    pub fn property_group_by_index(&self, index: usize) -> Option<&PropertyGroup> {
        self.property_groups.get(index)
    }

    pub fn property_group(&self, name: &str) -> Option<&PropertyGroup> {
        self.property_groups.iter().find(|g| g.has_property(name))
    }

    pub fn property_group_index(&self, name: &str) -> Option<usize> {
        self.property_groups.iter().position(|g| g.has_property(name))
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.property_groups.iter().find_map(|g| g.property(name))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn property_type(&self, name: &str) -> GraphResult<&DataType> {
        self.property(name)
            .map(|p| &p.data_type)
            .ok_or_else(|| GraphError::UnknownProperty(name.to_string()))
    }

    pub fn is_primary_key(&self, name: &str) -> GraphResult<bool> {
        self.property(name)
            .map(|p| p.is_primary)
            .ok_or_else(|| GraphError::UnknownProperty(name.to_string()))
    }

    pub fn is_nullable_key(&self, name: &str) -> GraphResult<bool> {
        self.property(name)
            .map(|p| p.is_nullable)
            .ok_or_else(|| GraphError::UnknownProperty(name.to_string()))
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.property_groups.iter().flat_map(|g| g.properties())
    }

    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let text = super::read_descriptor(path.as_ref())?;
        let descriptor: EdgeDescriptor = serde_yaml::from_str(&text)?;
        descriptor.into_info()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> GraphResult<()> {
        std::fs::write(path, self.dump()?)?;
        Ok(())
    }

    pub fn dump(&self) -> GraphResult<String> {
        Ok(serde_yaml::to_string(&EdgeDescriptor::from_info(self))?)
    }
}
