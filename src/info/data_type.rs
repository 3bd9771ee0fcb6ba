use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Declared type of a property
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int32,
    Int64,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    String,
    /// Days since the UNIX epoch
    Date,
    /// Milliseconds since the UNIX epoch
    Timestamp,
    /// Nested list; schema-only, builders and readers reject it
    List(Box<DataType>),
}

impl DataType {
    pub fn list(value_type: DataType) -> Self {
        DataType::List(Box::new(value_type))
    }

    /// Element type of a list, `None` for scalars
    pub fn value_type(&self) -> Option<&DataType> {
        match self {
            DataType::List(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, DataType::List(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "bool"),
            DataType::Int32 => write!(f, "int32"),
            DataType::Int64 => write!(f, "int64"),
            DataType::Float => write!(f, "float"),
            DataType::Double => write!(f, "double"),
            DataType::String => write!(f, "string"),
            DataType::Date => write!(f, "date"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::List(inner) => write!(f, "list<{}>", inner),
        }
    }
}

impl FromStr for DataType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "bool" => Ok(DataType::Bool),
            "int32" => Ok(DataType::Int32),
            "int64" => Ok(DataType::Int64),
            "float" => Ok(DataType::Float),
            "double" => Ok(DataType::Double),
            "string" => Ok(DataType::String),
            "date" => Ok(DataType::Date),
            "timestamp" => Ok(DataType::Timestamp),
            _ => {
                let inner = s
                    .strip_prefix("list<")
                    .and_then(|rest| rest.strip_suffix('>'))
                    .ok_or_else(|| {
                        GraphError::schema("data_type", format!("unknown data type '{}'", s))
                    })?;
                Ok(DataType::list(inner.parse()?))
            }
        }
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How many values a property holds per row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    #[default]
    Single,
    List,
    Set,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::List => write!(f, "list"),
            Cardinality::Set => write!(f, "set"),
        }
    }
}

/// Physical encoding of chunk files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Csv,
    Parquet,
    Orc,
    Json,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Csv => write!(f, "csv"),
            FileType::Parquet => write!(f, "parquet"),
            FileType::Orc => write!(f, "orc"),
            FileType::Json => write!(f, "json"),
        }
    }
}

impl FromStr for FileType {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        match s {
            "csv" => Ok(FileType::Csv),
            "parquet" => Ok(FileType::Parquet),
            "orc" => Ok(FileType::Orc),
            "json" => Ok(FileType::Json),
            other => Err(GraphError::schema(
                "file_type",
                format!("unknown file type '{}'", other),
            )),
        }
    }
}
