//! Schema model
//!
//! Immutable, versioned descriptions of vertex and edge types, their
//! property groups and on-disk prefixes, plus YAML descriptor load/save.

pub mod data_type;
pub(crate) mod descriptor;
pub mod edge_info;
pub mod graph_info;
pub mod property;
pub mod version;
pub mod vertex_info;

pub use data_type::{Cardinality, DataType, FileType};
pub use edge_info::{AdjListType, AdjacentList, AlignedBy, EdgeInfo};
pub use graph_info::GraphInfo;
pub use property::{Property, PropertyGroup};
pub use version::InfoVersion;
pub use vertex_info::VertexInfo;

use crate::error::{GraphError, GraphResult};
use std::path::Path;

fn read_descriptor(path: &Path) -> GraphResult<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(GraphError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
