use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Format version of descriptors and chunk layout
///
/// Compared by its integer tag. Descriptor form: `gar/v<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InfoVersion(u32);

impl InfoVersion {
    /// Versions the engine knows how to lay out
    pub const SUPPORTED: &'static [u32] = &[1];

    pub fn new(version: u32) -> GraphResult<Self> {
        if !Self::SUPPORTED.contains(&version) {
            return Err(GraphError::schema(
                "version",
                format!("unsupported version {}", version),
            ));
        }
        Ok(Self(version))
    }

    pub fn version(&self) -> u32 {
        self.0
    }
}

impl Default for InfoVersion {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for InfoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gar/v{}", self.0)
    }
}

impl FromStr for InfoVersion {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        let number = s
            .trim()
            .strip_prefix("gar/v")
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| GraphError::schema("version", format!("malformed version '{}'", s)))?;
        Self::new(number)
    }
}

impl Serialize for InfoVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for InfoVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
