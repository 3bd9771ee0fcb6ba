//! Serde shapes of the YAML descriptor files
//!
//! Kept apart from the validated info types so that every loaded descriptor
//! passes through the same constructors as programmatic schemas.

use super::data_type::{Cardinality, DataType, FileType};
use super::edge_info::{AdjListType, AdjacentList, AlignedBy, EdgeInfo};
use super::property::{Property, PropertyGroup};
use super::version::InfoVersion;
use super::vertex_info::VertexInfo;
use crate::error::GraphResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PropertyDescriptor {
    name: String,
    data_type: DataType,
    #[serde(default)]
    is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_nullable: Option<bool>,
    #[serde(default)]
    cardinality: Cardinality,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PropertyGroupDescriptor {
    properties: Vec<PropertyDescriptor>,
    file_type: FileType,
    #[serde(default)]
    prefix: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct VertexDescriptor {
    #[serde(rename = "type")]
    type_name: String,
    chunk_size: i64,
    #[serde(default)]
    prefix: String,
    #[serde(default)]
    property_groups: Vec<PropertyGroupDescriptor>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    version: InfoVersion,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AdjListDescriptor {
    ordered: bool,
    aligned_by: AlignedBy,
    #[serde(default)]
    prefix: String,
    file_type: FileType,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EdgeDescriptor {
    src_type: String,
    edge_type: String,
    dst_type: String,
    chunk_size: i64,
    src_chunk_size: i64,
    dst_chunk_size: i64,
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    prefix: String,
    adj_lists: Vec<AdjListDescriptor>,
    #[serde(default)]
    property_groups: Vec<PropertyGroupDescriptor>,
    #[serde(default)]
    version: InfoVersion,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GraphDescriptor {
    pub name: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub vertices: Vec<String>,
    #[serde(default)]
    pub edges: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub version: InfoVersion,
}

impl PropertyGroupDescriptor {
    fn from_group(group: &PropertyGroup) -> Self {
        Self {
            properties: group
                .properties()
                .iter()
                .map(|p| PropertyDescriptor {
                    name: p.name.clone(),
                    data_type: p.data_type.clone(),
                    is_primary: p.is_primary,
                    is_nullable: Some(p.is_nullable),
                    cardinality: p.cardinality,
                })
                .collect(),
            file_type: group.file_type(),
            prefix: group.prefix().to_string(),
        }
    }

    fn into_group(self) -> GraphResult<PropertyGroup> {
        let properties = self
            .properties
            .into_iter()
            .map(|p| {
                // nullable unless primary when the descriptor is silent
                let is_nullable = p.is_nullable.unwrap_or(!p.is_primary);
                Property::new(p.name, p.data_type, p.is_primary, is_nullable, p.cardinality)
            })
            .collect();
        PropertyGroup::new(properties, self.file_type, self.prefix)
    }
}

fn groups_from(groups: &[PropertyGroup]) -> Vec<PropertyGroupDescriptor> {
    groups.iter().map(PropertyGroupDescriptor::from_group).collect()
}

fn groups_into(groups: Vec<PropertyGroupDescriptor>) -> GraphResult<Vec<PropertyGroup>> {
    groups.into_iter().map(|g| g.into_group()).collect()
}

impl VertexDescriptor {
    pub(crate) fn from_info(info: &VertexInfo) -> Self {
        Self {
            type_name: info.type_name().to_string(),
            chunk_size: info.chunk_size(),
            prefix: info.prefix().to_string(),
            property_groups: groups_from(info.property_groups()),
            labels: info.labels().to_vec(),
            version: info.version(),
        }
    }

    pub(crate) fn into_info(self) -> GraphResult<VertexInfo> {
        VertexInfo::new(
            self.type_name,
            self.chunk_size,
            groups_into(self.property_groups)?,
            self.labels,
            self.prefix,
            self.version,
        )
    }
}

impl EdgeDescriptor {
    pub(crate) fn from_info(info: &EdgeInfo) -> Self {
        Self {
            src_type: info.src_type().to_string(),
            edge_type: info.edge_type().to_string(),
            dst_type: info.dst_type().to_string(),
            chunk_size: info.chunk_size(),
            src_chunk_size: info.src_chunk_size(),
            dst_chunk_size: info.dst_chunk_size(),
            directed: info.is_directed(),
            prefix: info.prefix().to_string(),
            adj_lists: info
                .adjacent_lists()
                .iter()
                .map(|adj| AdjListDescriptor {
                    ordered: adj.adj_type().is_ordered(),
                    aligned_by: adj.adj_type().aligned_by(),
                    prefix: adj.prefix().to_string(),
                    file_type: adj.file_type(),
                })
                .collect(),
            property_groups: groups_from(info.property_groups()),
            version: info.version(),
        }
    }

    pub(crate) fn into_info(self) -> GraphResult<EdgeInfo> {
        let adjacent_lists = self
            .adj_lists
            .into_iter()
            .map(|adj| {
                AdjacentList::new(
                    AdjListType::from_parts(adj.ordered, adj.aligned_by),
                    adj.file_type,
                    adj.prefix,
                )
            })
            .collect();
        EdgeInfo::new(
            self.src_type,
            self.edge_type,
            self.dst_type,
            self.chunk_size,
            self.src_chunk_size,
            self.dst_chunk_size,
            self.directed,
            adjacent_lists,
            groups_into(self.property_groups)?,
            self.prefix,
            self.version,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handwritten_vertex_descriptor() {
        let yaml = r#"
type: person
chunk_size: 100
prefix: vertex/person/
property_groups:
  - properties:
      - name: id
        data_type: int64
        is_primary: true
    file_type: parquet
  - properties:
      - name: firstName
        data_type: string
        is_primary: false
      - name: gender
        data_type: string
        is_primary: false
        is_nullable: false
    prefix: firstName_gender/
    file_type: csv
labels: [student]
version: gar/v1
"#;
        let info: VertexInfo = serde_yaml::from_str::<VertexDescriptor>(yaml)
            .unwrap()
            .into_info()
            .unwrap();
        assert_eq!(info.type_name(), "person");
        assert_eq!(info.prefix(), "vertex/person/");
        assert_eq!(info.property_group_by_index(0).unwrap().prefix(), "id/");
        assert!(!info.is_nullable_key("id").unwrap());
        assert!(info.is_nullable_key("firstName").unwrap());
        assert!(!info.is_nullable_key("gender").unwrap());
    }

    #[test]
    fn test_parse_handwritten_edge_descriptor() {
        let yaml = r#"
src_type: person
edge_type: knows
dst_type: person
chunk_size: 1024
src_chunk_size: 100
dst_chunk_size: 100
directed: false
adj_lists:
  - ordered: true
    aligned_by: src
    file_type: parquet
  - ordered: false
    aligned_by: dst
    prefix: custom/
    file_type: csv
version: gar/v1
"#;
        let info = serde_yaml::from_str::<EdgeDescriptor>(yaml)
            .unwrap()
            .into_info()
            .unwrap();
        assert_eq!(info.prefix(), "person_knows_person/");
        assert!(info.has_adjacent_list_type(AdjListType::OrderedBySource));
        assert_eq!(
            info.adjacent_list(AdjListType::UnorderedByDest)
                .unwrap()
                .prefix(),
            "custom/"
        );
        assert_eq!(info.property_group_num(), 0);
    }

    #[test]
    fn test_unknown_data_type_rejected() {
        let yaml = r#"
type: v
chunk_size: 10
property_groups:
  - properties:
      - name: x
        data_type: decimal
    file_type: parquet
"#;
        assert!(serde_yaml::from_str::<VertexDescriptor>(yaml).is_err());
    }
}
