use super::descriptor::GraphDescriptor;
use super::edge_info::EdgeInfo;
use super::version::InfoVersion;
use super::vertex_info::{check_labels, VertexInfo};
use crate::error::{GraphError, GraphResult};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Root schema aggregate
///
/// Single owner of every vertex and edge info. Collections share it through
/// `Arc<GraphInfo>`; edge infos name their endpoint types and are resolved
/// here by lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphInfo {
    name: String,
    vertex_infos: Vec<Arc<VertexInfo>>,
    edge_infos: Vec<Arc<EdgeInfo>>,
    labels: Vec<String>,
    prefix: String,
    version: InfoVersion,
}

impl GraphInfo {
    /// Create a graph info
    ///
    /// An empty `prefix` defaults to `"./"`. Every child must carry the
    /// graph's version.
    pub fn new(
        name: impl Into<String>,
        vertex_infos: Vec<VertexInfo>,
        edge_infos: Vec<EdgeInfo>,
        labels: Vec<String>,
        prefix: impl Into<String>,
        version: InfoVersion,
    ) -> GraphResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(GraphError::schema("name", "graph name is empty"));
        }
        check_labels(&labels)?;

        let mut types = HashSet::new();
        for info in &vertex_infos {
            if !types.insert(info.type_name()) {
                return Err(GraphError::schema(
                    "vertices",
                    format!("duplicate vertex type '{}'", info.type_name()),
                ));
            }
            if info.version() != version {
                return Err(GraphError::schema(
                    "version",
                    format!(
                        "vertex type '{}' has version {}, graph has {}",
                        info.type_name(),
                        info.version(),
                        version
                    ),
                ));
            }
        }

        let mut triples = HashSet::new();
        for info in &edge_infos {
            if !triples.insert((info.src_type(), info.edge_type(), info.dst_type())) {
                return Err(GraphError::schema(
                    "edges",
                    format!("duplicate edge triple '{}'", info.concat_key()),
                ));
            }
            if info.version() != version {
                return Err(GraphError::schema(
                    "version",
                    format!(
                        "edge type '{}' has version {}, graph has {}",
                        info.concat_key(),
                        info.version(),
                        version
                    ),
                ));
            }
        }

        let mut prefix = prefix.into();
        if prefix.is_empty() {
            prefix = "./".to_string();
        }

        Ok(Self {
            name,
            vertex_infos: vertex_infos.into_iter().map(Arc::new).collect(),
            edge_infos: edge_infos.into_iter().map(Arc::new).collect(),
            labels,
            prefix,
            version,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root directory all chunk paths are relative to
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn version(&self) -> InfoVersion {
        self.version
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn vertex_infos(&self) -> &[Arc<VertexInfo>] {
        &self.vertex_infos
    }

    pub fn edge_infos(&self) -> &[Arc<EdgeInfo>] {
        &self.edge_infos
    }

    pub fn vertex_info_num(&self) -> usize {
        self.vertex_infos.len()
    }

    pub fn edge_info_num(&self) -> usize {
        self.edge_infos.len()
    }

    pub fn vertex_info_index(&self, type_name: &str) -> Option<usize> {
        self.vertex_infos
            .iter()
            .position(|v| v.type_name() == type_name)
    }

    pub fn edge_info_index(&self, src_type: &str, edge_type: &str, dst_type: &str) -> Option<usize> {
        self.edge_infos.iter().position(|e| {
            e.src_type() == src_type && e.edge_type() == edge_type && e.dst_type() == dst_type
        })
    }

    pub fn vertex_info(&self, type_name: &str) -> Option<&Arc<VertexInfo>> {
        self.vertex_info_index(type_name)
            .map(|i| &self.vertex_infos[i])
    }

    pub fn edge_info(&self, src_type: &str, edge_type: &str, dst_type: &str) -> Option<&Arc<EdgeInfo>> {
        self.edge_info_index(src_type, edge_type, dst_type)
            .map(|i| &self.edge_infos[i])
    }

    pub fn vertex_info_by_index(&self, index: usize) -> Option<&Arc<VertexInfo>> {
        self.vertex_infos.get(index)
    }

    pub fn edge_info_by_index(&self, index: usize) -> Option<&Arc<EdgeInfo>> {
        self.edge_infos.get(index)
    }

    /// Copy of this graph with one more vertex type
    pub fn with_vertex(&self, info: VertexInfo) -> GraphResult<Self> {
        let mut vertex_infos: Vec<VertexInfo> =
            self.vertex_infos.iter().map(|v| (**v).clone()).collect();
        vertex_infos.push(info);
        let edge_infos = self.edge_infos.iter().map(|e| (**e).clone()).collect();
        Self::new(
            self.name.clone(),
            vertex_infos,
            edge_infos,
            self.labels.clone(),
            self.prefix.clone(),
            self.version,
        )
    }

    /// Copy of this graph with one more edge type
    pub fn with_edge(&self, info: EdgeInfo) -> GraphResult<Self> {
        let vertex_infos = self.vertex_infos.iter().map(|v| (**v).clone()).collect();
        let mut edge_infos: Vec<EdgeInfo> = self.edge_infos.iter().map(|e| (**e).clone()).collect();
        edge_infos.push(info);
        Self::new(
            self.name.clone(),
            vertex_infos,
            edge_infos,
            self.labels.clone(),
            self.prefix.clone(),
            self.version,
        )
    }

    /// Load a graph descriptor and every descriptor it lists
    ///
    /// Listed files and a relative `prefix` are resolved against the graph
    /// descriptor's directory.
    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let text = super::read_descriptor(path)?;
        let descriptor: GraphDescriptor = serde_yaml::from_str(&text)?;
        let dir = descriptor_dir(path);

        let vertex_infos = descriptor
            .vertices
            .iter()
            .map(|file| VertexInfo::load(dir.join(file)))
            .collect::<GraphResult<Vec<_>>>()?;
        let edge_infos = descriptor
            .edges
            .iter()
            .map(|file| EdgeInfo::load(dir.join(file)))
            .collect::<GraphResult<Vec<_>>>()?;

        let prefix = resolve_prefix(dir, &descriptor.prefix);
        tracing::debug!(
            graph = %descriptor.name,
            vertices = vertex_infos.len(),
            edges = edge_infos.len(),
            "loaded graph descriptor"
        );

        Self::new(
            descriptor.name,
            vertex_infos,
            edge_infos,
            descriptor.labels,
            prefix,
            descriptor.version,
        )
    }

    /// Write the graph descriptor plus one descriptor per vertex and edge
    /// type into the same directory
    pub fn save(&self, path: impl AsRef<Path>) -> GraphResult<()> {
        let path = path.as_ref();
        let dir = descriptor_dir(path);
        for info in &self.vertex_infos {
            info.save(dir.join(vertex_file_name(info)))?;
        }
        for info in &self.edge_infos {
            info.save(dir.join(edge_file_name(info)))?;
        }
        std::fs::write(path, self.dump()?)?;
        Ok(())
    }

    /// YAML of the graph descriptor itself
    pub fn dump(&self) -> GraphResult<String> {
        let descriptor = GraphDescriptor {
            name: self.name.clone(),
            prefix: self.prefix.clone(),
            vertices: self.vertex_infos.iter().map(|v| vertex_file_name(v)).collect(),
            edges: self.edge_infos.iter().map(|e| edge_file_name(e)).collect(),
            labels: self.labels.clone(),
            version: self.version,
        };
        Ok(serde_yaml::to_string(&descriptor)?)
    }
}

fn vertex_file_name(info: &VertexInfo) -> String {
    format!("{}.vertex.yml", info.type_name())
}

fn edge_file_name(info: &EdgeInfo) -> String {
    format!("{}.edge.yml", info.concat_key())
}

fn descriptor_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn resolve_prefix(dir: &Path, prefix: &str) -> String {
    let resolved = if prefix.is_empty() {
        dir.to_string_lossy().into_owned()
    } else if Path::new(prefix).is_absolute() {
        prefix.to_string()
    } else {
        dir.join(prefix).to_string_lossy().into_owned()
    };
    if resolved.ends_with('/') {
        resolved
    } else {
        format!("{}/", resolved)
    }
}
