//! Read side: collections and cursors over chunk files
//!
//! Collections are cheap descriptions of a set of vertices or edges bound to
//! a shared `GraphInfo`; nothing is loaded up front apart from counts.
//! Cursors (`VertexIter`, `EdgeIter`) borrow their collection and fetch
//! chunks lazily through a private `ChunkCache`.
//!
//! ```text
//! VerticesCollection ──begin()/find(id)──> VertexIter ──vertex()──> VertexView
//!        │                                    │
//!        └─filter / filter_by_labels          └─ChunkCache (group, chunk)
//!
//! EdgesCollection ──begin()/find_src(id)──> EdgeIter ──edge()──> EdgeView
//! ```

pub mod cache;
pub mod edges;
pub mod vertices;

pub use cache::{CacheSlot, ChunkCache};
pub use edges::{EdgeIter, EdgeView, EdgesCollection};
pub use vertices::{VertexIter, VertexView, VerticesCollection};

use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How property filters are evaluated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Arrow compute kernels over whole chunk columns
    #[default]
    Pushdown,
    /// One expression evaluation per row
    RowWise,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::Pushdown => write!(f, "pushdown"),
            FilterMode::RowWise => write!(f, "row_wise"),
        }
    }
}

impl FromStr for FilterMode {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pushdown" => Ok(FilterMode::Pushdown),
            "row_wise" => Ok(FilterMode::RowWise),
            other => Err(GraphError::invalid(format!(
                "unknown filter mode '{}', expected pushdown or row_wise",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_mode_parse() {
        assert_eq!("Pushdown".parse::<FilterMode>().unwrap(), FilterMode::Pushdown);
        assert_eq!("row_wise".parse::<FilterMode>().unwrap(), FilterMode::RowWise);
        assert!("acero".parse::<FilterMode>().is_err());
        assert_eq!(FilterMode::RowWise.to_string(), "row_wise");
    }
}
