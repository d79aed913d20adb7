//! scamintel Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! defaults suitable for running the extractor on chat transcripts.
//! Scoring weights and keyword tables are compiled in and not configurable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Extraction engine settings
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
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

    /// Merge with environment variables; every variable that is set wins
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Ok(value) = std::env::var("SCAMINTEL_MAX_INPUT_CHARS") {
            self.extraction.max_input_chars =
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "SCAMINTEL_MAX_INPUT_CHARS".to_string(),
                    value,
                })?;
        }
        if let Ok(value) = std::env::var("SCAMINTEL_RECORD_METRICS") {
            self.extraction.record_metrics = parse_bool("SCAMINTEL_RECORD_METRICS", value)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(value) = std::env::var("LOG_JSON") {
            self.logging.json_format = parse_bool("LOG_JSON", value)?;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.extraction.max_input_chars == 0 {
            return Err(ConfigError::InvalidValue {
                key: "extraction.max_input_chars".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
    }
}

/// Extraction engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Inputs longer than this many characters are truncated before matching
    pub max_input_chars: usize,

    /// Report per-type counts to the observer after each extraction
    pub record_metrics: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 20_000,
            record_metrics: true,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.extraction.max_input_chars, 20_000);
        assert!(config.extraction.record_metrics);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [extraction]
            max_input_chars = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction.max_input_chars, 500);
        assert!(config.extraction.record_metrics);
        assert!(!config.logging.json_format);
    }

    #[test]
    fn test_zero_input_limit_rejected() {
        let config = AppConfig {
            extraction: ExtractionConfig {
                max_input_chars: 0,
                record_metrics: false,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("K", "Yes".to_string()).unwrap());
        assert!(!parse_bool("K", "0".to_string()).unwrap());
        assert!(parse_bool("K", "maybe".to_string()).is_err());
    }

    #[test]
    fn test_env_overrides_file_even_with_default_values() {
        let path = std::env::temp_dir().join(format!("scamintel-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[extraction]\nrecord_metrics = false\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        std::env::set_var("SCAMINTEL_RECORD_METRICS", "true");
        std::env::set_var("LOG_LEVEL", "info");
        let config = AppConfig::from_file(&path).unwrap().with_env_override();
        std::env::remove_var("SCAMINTEL_RECORD_METRICS");
        std::env::remove_var("LOG_LEVEL");
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert!(config.extraction.record_metrics);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/nonexistent/scamintel.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
