//! Engine configuration
//!
//! Values come from `Default` or from the environment (a `.env` file is
//! honoured):
//! - GRAPHAR_FILTER_MODE: pushdown | row_wise
//! - GRAPHAR_VALIDATE_LEVEL: none | weak | strong
//! - GRAPHAR_LOG_LEVEL: tracing env-filter directive
//! - GRAPHAR_LOG_FORMAT: json | pretty

use crate::builder::ValidateLevel;
use crate::error::{GraphError, GraphResult};
use crate::reader::FilterMode;
use serde::Deserialize;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub builder: BuilderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReaderConfig {
    #[serde(default)]
    pub filter_mode: FilterMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuilderConfig {
    #[serde(default)]
    pub validate_level: ValidateLevel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GraphResult<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GraphResult<Self> {
        let defaults = LoggingConfig::default();
        let config = Self {
            reader: ReaderConfig {
                filter_mode: lookup("GRAPHAR_FILTER_MODE")
                    .map(|v| v.parse::<FilterMode>())
                    .transpose()?
                    .unwrap_or_default(),
            },
            builder: BuilderConfig {
                validate_level: lookup("GRAPHAR_VALIDATE_LEVEL")
                    .map(|v| v.parse::<ValidateLevel>())
                    .transpose()?
                    .unwrap_or_default(),
            },
            logging: LoggingConfig {
                level: lookup("GRAPHAR_LOG_LEVEL").unwrap_or(defaults.level),
                format: lookup("GRAPHAR_LOG_FORMAT").unwrap_or(defaults.format),
            },
        };
        Ok(config)
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level. Only binaries should call this.
pub fn init_logging(config: &LoggingConfig) -> GraphResult<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };
    result.map_err(|e| GraphError::invalid(format!("logging already initialised: {}", e)))
}
