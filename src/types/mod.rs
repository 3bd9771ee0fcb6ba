//! Core data types for the engine
//!
//! This module defines the fundamental types used throughout the system:
//! - IdType / ChunkAddress: dense vertex ids and their chunk position
//! - Value: dynamically typed property value
//! - Vertex: vertex record consumed by builders
//! - Edge: edge record consumed by builders

pub mod chunk_id;
pub mod edge;
pub mod value;
pub mod vertex;

pub use chunk_id::{chunk_count, chunk_len, ChunkAddress, IdType};
pub use edge::Edge;
pub use value::{ComparisonDomain, FromValue, Value};
pub use vertex::Vertex;
