//! Builders that write in-memory records into the chunked layout
//!
//! - VerticesBuilder: stages vertices, writes property group and label chunks
//! - EdgesBuilder: stages edges, writes adjacency lists, offsets, edge
//!   property chunks and count files for each adjacency representation
//!
//! A failing `dump` leaves already-written chunks in place.

pub mod edges;
pub mod vertices;

pub use edges::EdgesBuilder;
pub use vertices::VerticesBuilder;

use crate::error::{GraphError, GraphResult};
use crate::info::PropertyGroup;
use crate::storage::arrow_convert::{ensure_storable, values_to_array};
use crate::types::Value;
use arrow::array::ArrayRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How much checking `add_vertex` / `add_edge` perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidateLevel {
    /// No checks; bad values surface at dump time
    None,
    /// Property names and labels must be declared
    Weak,
    /// Names, labels, value types and nullability
    #[default]
    Strong,
}

impl fmt::Display for ValidateLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateLevel::None => write!(f, "none"),
            ValidateLevel::Weak => write!(f, "weak"),
            ValidateLevel::Strong => write!(f, "strong"),
        }
    }
}

impl FromStr for ValidateLevel {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "no_validate" => Ok(ValidateLevel::None),
            "weak" | "weak_validate" => Ok(ValidateLevel::Weak),
            "strong" | "strong_validate" => Ok(ValidateLevel::Strong),
            other => Err(GraphError::invalid(format!(
                "unknown validate level '{}'",
                other
            ))),
        }
    }
}

/// Check a record's properties against its declared groups
pub(crate) fn validate_properties(
    groups: &[PropertyGroup],
    properties: &HashMap<String, Value>,
    level: ValidateLevel,
) -> GraphResult<()> {
    if level == ValidateLevel::None {
        return Ok(());
    }

    for (name, value) in properties {
        let property = groups
            .iter()
            .find_map(|g| g.property(name))
            .ok_or_else(|| GraphError::UnknownProperty(name.clone()))?;
        if level != ValidateLevel::Strong {
            continue;
        }
        ensure_storable(property)?;
        if value.is_null() {
            if !property.is_nullable {
                return Err(GraphError::invalid(format!(
                    "property '{}' is not nullable",
                    name
                )));
            }
        } else if !value.conforms_to(&property.data_type) {
            return Err(GraphError::TypeMismatch {
                property: name.clone(),
                expected: property.data_type.to_string(),
                actual: value.type_name(),
            });
        }
    }

    if level == ValidateLevel::Strong {
        for property in groups.iter().flat_map(|g| g.properties()) {
            if !property.is_nullable && !properties.contains_key(&property.name) {
                return Err(GraphError::invalid(format!(
                    "missing non-nullable property '{}'",
                    property.name
                )));
            }
        }
    }
    Ok(())
}

/// Columns of one property group for a run of records
pub(crate) fn group_columns<'a, I>(group: &PropertyGroup, records: I) -> GraphResult<Vec<ArrayRef>>
where
    I: Iterator<Item = &'a HashMap<String, Value>> + Clone,
{
    group
        .properties()
        .iter()
        .map(|property| {
            let values: Vec<Value> = records
                .clone()
                .map(|props| props.get(&property.name).cloned().unwrap_or(Value::Null))
                .collect();
            values_to_array(&property.name, &property.data_type, &values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{Cardinality, DataType, FileType, Property};

    fn groups() -> Vec<PropertyGroup> {
        vec![PropertyGroup::new(
            vec![
                Property::simple("id", DataType::Int64, true),
                Property::simple("name", DataType::String, false),
                Property::new("tags", DataType::String, false, true, Cardinality::List),
            ],
            FileType::Parquet,
            "",
        )
        .unwrap()]
    }

    fn props(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_validate_levels() {
        let groups = groups();
        let wrong_type = props(&[("id", Value::Int32(1))]);
        assert!(matches!(
            validate_properties(&groups, &wrong_type, ValidateLevel::Strong),
            Err(GraphError::TypeMismatch { .. })
        ));
        assert!(validate_properties(&groups, &wrong_type, ValidateLevel::Weak).is_ok());

        let unknown = props(&[("id", Value::Int64(1)), ("height", Value::Int32(3))]);
        assert!(matches!(
            validate_properties(&groups, &unknown, ValidateLevel::Weak),
            Err(GraphError::UnknownProperty(_))
        ));
        assert!(validate_properties(&groups, &unknown, ValidateLevel::None).is_ok());
    }

    #[test]
    fn test_missing_and_null_primary() {
        let groups = groups();
        let missing = props(&[("name", Value::from("x"))]);
        assert!(matches!(
            validate_properties(&groups, &missing, ValidateLevel::Strong),
            Err(GraphError::InvalidArgument(_))
        ));
        let null_id = props(&[("id", Value::Null)]);
        assert!(matches!(
            validate_properties(&groups, &null_id, ValidateLevel::Strong),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_list_cardinality_unsupported() {
        let groups = groups();
        let tagged = props(&[("id", Value::Int64(1)), ("tags", Value::from("a"))]);
        assert!(matches!(
            validate_properties(&groups, &tagged, ValidateLevel::Strong),
            Err(GraphError::Unsupported(_))
        ));
    }

    #[test]
    fn test_validate_level_parse() {
        assert_eq!("weak".parse::<ValidateLevel>().unwrap(), ValidateLevel::Weak);
        assert_eq!(
            "STRONG_VALIDATE".parse::<ValidateLevel>().unwrap(),
            ValidateLevel::Strong
        );
        assert!("loose".parse::<ValidateLevel>().is_err());
        assert_eq!(ValidateLevel::default(), ValidateLevel::Strong);
    }
}
