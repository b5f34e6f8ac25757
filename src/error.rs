//! Error types and handling for the `vayu` engine

use thiserror::Error;

/// Main error type for the `vayu` engine
#[derive(Error, Debug)]
pub enum VayuError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Forward geocoding returned no results for a place name
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// Network failures talking to geocoding or prediction services
    #[error("Network error: {message}")]
    Network { message: String },

    /// Malformed responses from external services
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Dataset loading or validation errors
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// A newer search started while this one was in flight
    #[error("Search superseded by a newer request")]
    Superseded,

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl VayuError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new not-found error for a geocoding query
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            VayuError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            VayuError::NotFound { query } => {
                format!("City not found: {query}")
            }
            VayuError::Network { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            VayuError::Parse { .. } => {
                "Received an unexpected response from an external service.".to_string()
            }
            VayuError::Dataset { .. } => "Air quality dataset could not be loaded.".to_string(),
            VayuError::Superseded => "Search was superseded by a newer request.".to_string(),
            VayuError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for VayuError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::parse(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for VayuError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}
