//! triplemap Configuration Management
//!
//! Handles configuration from environment variables and TOML config files,
//! with defaults suitable for local use.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Durable write-back configuration
    pub persist: PersistConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Persistence
        if let Ok(path) = std::env::var("TRIPLEMAP_STORE_PATH") {
            config.persist.store_path = PathBuf::from(path);
        }
        if let Ok(threshold) = std::env::var("TRIPLEMAP_COMMIT_THRESHOLD") {
            config.persist.commit_threshold =
                threshold.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "TRIPLEMAP_COMMIT_THRESHOLD".to_string(),
                    value: threshold,
                })?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_flag("LOG_JSON", &json)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.persist.store_path != defaults.persist.store_path {
            self.persist.store_path = env_config.persist.store_path;
        }
        if env_config.persist.commit_threshold != defaults.persist.commit_threshold {
            self.persist.commit_threshold = env_config.persist.commit_threshold;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }

        Ok(self)
    }

    /// Check values that serde alone cannot reject
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.persist.validate()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Durable write-back configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    /// Backing N-Triples file
    pub store_path: PathBuf,

    /// Mutations held in memory before an automatic commit
    pub commit_threshold: usize,

    /// Suffix appended to `store_path` for the commit's temporary file
    pub temp_suffix: String,
}

impl PersistConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commit_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                key: "commit_threshold".to_string(),
                value: "0".to_string(),
            });
        }
        if self.temp_suffix.is_empty() {
            return Err(ConfigError::MissingRequired("temp_suffix".to_string()));
        }
        Ok(())
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("triplemap.nt"),
            commit_threshold: 100,
            temp_suffix: ".tmp".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
