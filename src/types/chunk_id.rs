use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense zero-based vertex identifier within one vertex type
pub type IdType = i64;

/// Position of an id inside the chunked id space
///
/// Format: id = chunk_index * chunk_size + offset
/// - chunk_index: which chunk file holds the row
/// - offset: row number inside that chunk file
///
/// Ids are never stored as a property; they are derived from file/row position.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChunkAddress {
    pub chunk_index: IdType,
    pub offset: IdType,
}

impl ChunkAddress {
    /// Split an id into chunk index and in-chunk offset
    ///
    /// # Returns
    /// * `Ok(ChunkAddress)` for a non-negative id and positive chunk size
    /// * `Err(GraphError::InvalidArgument)` otherwise
    pub fn of(id: IdType, chunk_size: IdType) -> GraphResult<Self> {
        if chunk_size <= 0 {
            return Err(GraphError::invalid(format!(
                "chunk size must be positive, got {}",
                chunk_size
            )));
        }
        if id < 0 {
            return Err(GraphError::invalid(format!("negative id {}", id)));
        }
        Ok(Self {
            chunk_index: id / chunk_size,
            offset: id % chunk_size,
        })
    }

    /// Rebuild the id this address was derived from
    pub fn id(&self, chunk_size: IdType) -> IdType {
        self.chunk_index * chunk_size + self.offset
    }
}

impl fmt::Display for ChunkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk{}+{}", self.chunk_index, self.offset)
    }
}

/// Number of chunks needed for `total` rows
pub fn chunk_count(total: IdType, chunk_size: IdType) -> IdType {
    if total <= 0 || chunk_size <= 0 {
        return 0;
    }
    (total + chunk_size - 1) / chunk_size
}

/// Number of rows held by chunk `chunk_index` when `total` rows exist
pub fn chunk_len(total: IdType, chunk_size: IdType, chunk_index: IdType) -> IdType {
    let start = chunk_index * chunk_size;
    (total - start).clamp(0, chunk_size)
}
