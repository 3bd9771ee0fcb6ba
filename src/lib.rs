//! rust-graphar
//!
//! Chunked property-graph storage and query engine. Vertices and edges are
//! stored as fixed-size chunk files described by YAML descriptors; reads go
//! straight to the chunks without loading the whole graph.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │              rust-graphar                        │
//! ├──────────────────────────────────────────────────┤
//! │  ┌──────────────────┐    ┌─────────────────────┐ │
//! │  │ Builders         │    │ Collections         │ │
//! │  │ (vertices/edges) │    │ + Expression filter │ │
//! │  └────────┬─────────┘    └──────────┬──────────┘ │
//! │           ↓                         ↓            │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │   Schema Model (GraphInfo, YAML)           │  │
//! │  └────────────────────┬───────────────────────┘  │
//! │                       ↓                          │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │   Chunk Store (parquet / csv / json)       │  │
//! │  └────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `types`: Ids, chunk arithmetic, dynamic values, builder records
//! - `info`: Schema model and descriptor load/save
//! - `storage`: Chunk layout, codecs and typed chunk I/O
//! - `builder`: Vertex and edge builders
//! - `reader`: Collections, cursors and chunk caches
//! - `expression`: Filter expressions, row-wise and pushdown evaluation
//! - `config`: Environment configuration and logging setup

pub mod builder;
pub mod config;
pub mod error;
pub mod expression;
pub mod info;
pub mod reader;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{GraphError, GraphResult};
pub use types::{ChunkAddress, Edge, FromValue, IdType, Value, Vertex};

// Re-export schema types
pub use info::{
    AdjListType, AdjacentList, AlignedBy, Cardinality, DataType, EdgeInfo, FileType, GraphInfo,
    InfoVersion, Property, PropertyGroup, VertexInfo,
};

// Re-export builder and reader types
pub use builder::{EdgesBuilder, ValidateLevel, VerticesBuilder};
pub use reader::{
    EdgeIter, EdgeView, EdgesCollection, FilterMode, VertexIter, VertexView, VerticesCollection,
};

pub use config::{init_logging, EngineConfig};
pub use expression::Expression;
pub use storage::ChunkStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
