use super::chunk_id::IdType;
use super::value::Value;
use std::collections::HashMap;

/// Edge record handed to an `EdgesBuilder`
///
/// Represents a directed edge with:
/// - Source vertex id (in the source type's id space)
/// - Destination vertex id (in the destination type's id space)
/// - Properties keyed by name
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Source vertex id
    pub src: IdType,

    /// Destination vertex id
    pub dst: IdType,

    properties: HashMap<String, Value>,
}

impl Edge {
    /// Create an edge with an empty property map
    pub fn new(src: IdType, dst: IdType) -> Self {
        Self {
            src,
            dst,
            properties: HashMap::new(),
        }
    }

    /// Set a property value
    pub fn add_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_property(name, value);
        self
    }

    /// Get a property value by name
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    /// Check if this edge is a self-loop
    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }

    /// Reverse the edge direction
    pub fn reverse(&self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
            properties: self.properties.clone(),
        }
    }
}
