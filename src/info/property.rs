use super::data_type::{Cardinality, DataType, FileType};
use crate::error::{GraphError, GraphResult};
use crate::storage::layout::RESERVED_DIRS;
use std::collections::HashSet;

/// One declared property of a vertex or edge type
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub data_type: DataType,
    pub is_primary: bool,
    pub is_nullable: bool,
    pub cardinality: Cardinality,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        is_primary: bool,
        is_nullable: bool,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_primary,
            is_nullable,
            cardinality,
        }
    }

    /// Single-valued property; nullable unless primary
    pub fn simple(name: impl Into<String>, data_type: DataType, is_primary: bool) -> Self {
        Self::new(name, data_type, is_primary, !is_primary, Cardinality::Single)
    }
}

/// Properties stored together in one file per chunk
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGroup {
    properties: Vec<Property>,
    file_type: FileType,
    prefix: String,
}

impl PropertyGroup {
    /// Create a property group
    ///
    /// An empty `prefix` defaults to the property names joined by `_`.
    ///
    /// # Returns
    /// * `Err(GraphError::Schema)` if the group is empty, repeats a name or
    ///   resolves to a directory the chunk layout reserves
    pub fn new(
        properties: Vec<Property>,
        file_type: FileType,
        prefix: impl Into<String>,
    ) -> GraphResult<Self> {
        if properties.is_empty() {
            return Err(GraphError::schema(
                "property_groups",
                "a property group needs at least one property",
            ));
        }

        let mut seen = HashSet::new();
        for property in &properties {
            if property.name.is_empty() {
                return Err(GraphError::schema("properties.name", "empty property name"));
            }
            if !seen.insert(property.name.as_str()) {
                return Err(GraphError::schema(
                    "properties.name",
                    format!("duplicate property '{}'", property.name),
                ));
            }
        }

        let mut prefix = prefix.into();
        if prefix.is_empty() {
            let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
            prefix = format!("{}/", names.join("_"));
        }
        let dir = prefix.trim_end_matches('/');
        if RESERVED_DIRS.iter().any(|reserved| *reserved == dir) {
            return Err(GraphError::schema(
                "prefix",
                format!("'{}' is reserved by the chunk layout", prefix),
            ));
        }

        Ok(Self {
            properties,
            file_type,
            prefix,
        })
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Column position of a property inside this group's files
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }
}

/// Reject property names repeated across groups of one vertex/edge info
pub(crate) fn check_unique_across_groups(groups: &[PropertyGroup]) -> GraphResult<()> {
    let mut seen = HashSet::new();
    for group in groups {
        for property in group.properties() {
            if !seen.insert(property.name.as_str()) {
                return Err(GraphError::schema(
                    "property_groups",
                    format!("property '{}' appears in more than one group", property.name),
                ));
            }
        }
    }
    Ok(())
}
