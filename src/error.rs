//! Error types shared by every layer of the engine
//!
//! All schema, builder and collection operations return `GraphResult<T>`.
//! Nothing recovers internally: each failure is handed back to the caller.

use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// Malformed or inconsistent descriptor / schema construction
    #[error("Schema error in '{field}': {message}")]
    Schema { field: String, message: String },

    /// Vertex type or edge triple not present in the graph info
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Property name not declared by the schema
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// A value disagrees with the declared data type
    #[error("Type mismatch for '{property}': expected {expected}, got {actual}")]
    TypeMismatch {
        property: String,
        expected: String,
        actual: String,
    },

    /// Expression operands are incompatible or null
    #[error("Type error: {0}")]
    TypeError(String),

    /// Argument rejected by an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Feature declared by the schema but not handled by the engine
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Descriptor or chunk file absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for engine operations
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Build a schema error naming the offending field
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        GraphError::Schema {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        GraphError::InvalidArgument(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        GraphError::TypeError(message.into())
    }
}
