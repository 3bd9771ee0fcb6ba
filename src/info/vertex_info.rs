use super::data_type::DataType;
use super::descriptor::VertexDescriptor;
use super::property::{check_unique_across_groups, Property, PropertyGroup};
use super::version::InfoVersion;
use crate::error::{GraphError, GraphResult};
use std::collections::HashSet;
use std::path::Path;

/// Schema and storage layout of one vertex type
#[derive(Debug, Clone, PartialEq)]
pub struct VertexInfo {
    type_name: String,
    chunk_size: i64,
    property_groups: Vec<PropertyGroup>,
    labels: Vec<String>,
    prefix: String,
    version: InfoVersion,
}

impl VertexInfo {
    /// Create a vertex info
    ///
    /// An empty `prefix` defaults to `"<type>/"`.
    ///
    /// # Returns
    /// * `Err(GraphError::Schema)` naming the first invalid field
    pub fn new(
        type_name: impl Into<String>,
        chunk_size: i64,
        property_groups: Vec<PropertyGroup>,
        labels: Vec<String>,
        prefix: impl Into<String>,
        version: InfoVersion,
    ) -> GraphResult<Self> {
        let type_name = type_name.into();
        if type_name.is_empty() {
            return Err(GraphError::schema("type", "vertex type name is empty"));
        }
        if chunk_size <= 0 {
            return Err(GraphError::schema(
                "chunk_size",
                format!("must be positive, got {}", chunk_size),
            ));
        }
        check_unique_across_groups(&property_groups)?;
        check_labels(&labels)?;

        let mut prefix = prefix.into();
        if prefix.is_empty() {
            prefix = format!("{}/", type_name);
        }

        Ok(Self {
            type_name,
            chunk_size,
            property_groups,
            labels,
            prefix,
            version,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn chunk_size(&self) -> i64 {
        self.chunk_size
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn version(&self) -> InfoVersion {
        self.version
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
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

    /// Group holding `name`
    pub fn property_group(&self, name: &str) -> Option<&PropertyGroup> {
        self.property_groups.iter().find(|g| g.has_property(name))
    }

    /// Index of the group holding `name`
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

    /// All declared properties in group order
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.property_groups.iter().flat_map(|g| g.properties())
    }

    /// Load a single vertex descriptor
    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let text = super::read_descriptor(path.as_ref())?;
        let descriptor: VertexDescriptor = serde_yaml::from_str(&text)?;
        descriptor.into_info()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> GraphResult<()> {
        std::fs::write(path, self.dump()?)?;
        Ok(())
    }

    pub fn dump(&self) -> GraphResult<String> {
        Ok(serde_yaml::to_string(&VertexDescriptor::from_info(self))?)
    }
}

pub(crate) fn check_labels(labels: &[String]) -> GraphResult<()> {
    let mut seen = HashSet::new();
    for label in labels {
        if label.is_empty() {
            return Err(GraphError::schema("labels", "empty label"));
        }
        if !seen.insert(label.as_str()) {
            return Err(GraphError::schema(
                "labels",
                format!("duplicate label '{}'", label),
            ));
        }
    }
    Ok(())
}
