use super::value::Value;
use std::collections::{BTreeSet, HashMap};

/// Vertex record handed to a `VerticesBuilder`
///
/// Represents one row to be written:
/// - Properties keyed by name
/// - Labels the vertex carries
///
/// The id is not part of the record; the builder assigns the next free id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertex {
    properties: HashMap<String, Value>,
    labels: BTreeSet<String>,
}

impl Vertex {
    /// Create an empty vertex record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property value
    pub fn add_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Builder-style variant of `add_property`
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_property(name, value);
        self
    }

    pub fn add_label(&mut self, label: impl Into<String>) {
        self.labels.insert(label.into());
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.add_label(label);
        self
    }

    /// Get a property value by name
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Remove a property
    pub fn remove_property(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Get all property names
    pub fn property_keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_creation() {
        let vertex = Vertex::new()
            .with_property("name", "Alice")
            .with_property("age", 30_i32)
            .with_label("person");

        assert_eq!(vertex.get_property("name"), Some(&Value::from("Alice")));
        assert_eq!(vertex.get_property("age"), Some(&Value::Int32(30)));
        assert!(vertex.has_label("person"));
        assert!(!vertex.has_label("company"));
    }

    #[test]
    fn test_vertex_empty() {
        let vertex = Vertex::new();
        assert!(vertex.property_keys().is_empty());
        assert!(vertex.labels().is_empty());
    }

    #[test]
    fn test_vertex_overwrite_property() {
        let mut vertex = Vertex::new();
        vertex.add_property("age", 25_i32);
        vertex.add_property("age", 26_i32);
        assert_eq!(vertex.get_property("age"), Some(&Value::Int32(26)));
    }

    #[test]
    fn test_vertex_remove_property() {
        let mut vertex = Vertex::new()
            .with_property("name", "Alice")
            .with_property("age", 30_i32);

        let removed = vertex.remove_property("age");
        assert_eq!(removed, Some(Value::Int32(30)));
        assert!(!vertex.has_property("age"));
        assert!(vertex.has_property("name"));
    }

    #[test]
    fn test_vertex_property_keys() {
        let vertex = Vertex::new()
            .with_property("name", "Alice")
            .with_property("age", 30_i32)
            .with_property("city", "Beijing");

        let mut keys = vertex.property_keys();
        keys.sort();
        assert_eq!(keys, vec!["age", "city", "name"]);
    }
}
