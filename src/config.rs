//! Configuration management for the `vayu` engine
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::VayuError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `vayu` engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VayuConfig {
    /// Station dataset configuration
    #[serde(default)]
    pub dataset: DatasetConfig,
    /// Geocoding service configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Prediction service configuration
    #[serde(default)]
    pub prediction: PredictionConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Station dataset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the station snapshot JSON file
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the forward-geocoding search endpoint
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u32,
    /// User agent sent with geocoding requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Prediction service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Base URL of the PM2.5 prediction service
    #[serde(default = "default_prediction_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the API server
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Directory of static frontend assets, served at the root
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_dataset_path() -> String {
    "data/updated_pm25_data.json".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_prediction_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout() -> u32 {
    8
}

fn default_user_agent() -> String {
    format!("vayu/{}", env!("CARGO_PKG_VERSION"))
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for VayuConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            geocoding: GeocodingConfig::default(),
            prediction: PredictionConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            base_url: default_prediction_base_url(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl VayuConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides with VAYU_ prefix
        builder = builder.add_source(
            Environment::with_prefix("VAYU")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: VayuConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vayu").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.dataset.path.is_empty() {
            return Err(VayuError::config("Dataset path cannot be empty").into());
        }

        if self.geocoding.timeout_seconds == 0 || self.geocoding.timeout_seconds > 300 {
            return Err(
                VayuError::config("Geocoding timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.prediction.timeout_seconds == 0 || self.prediction.timeout_seconds > 300 {
            return Err(
                VayuError::config("Prediction timeout must be between 1 and 300 seconds").into(),
            );
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Prediction", &self.prediction.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(VayuError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(VayuError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(VayuError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VayuConfig::default();
        assert_eq!(config.geocoding.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.prediction.base_url, "http://localhost:5000");
        assert_eq!(config.geocoding.timeout_seconds, 8);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_timeout() {
        let mut config = VayuConfig::default();
        config.geocoding.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.geocoding.timeout_seconds = 500;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("between 1 and 300"));
    }

    #[test]
    fn test_validation_rejects_bad_urls() {
        let mut config = VayuConfig::default();
        config.prediction.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("valid HTTP or HTTPS URL"));
    }

    #[test]
    fn test_validation_rejects_bad_log_level() {
        let mut config = VayuConfig::default();
        config.logging.level = "noisy".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_path_generation() {
        let path = VayuConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("vayu"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
