//! Error types and handling for the `StepSafe` service

use thiserror::Error;

/// Main error type for the `StepSafe` application
#[derive(Error, Debug)]
pub enum StepSafeError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Climate or geocoding API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A location could not be resolved to coordinates
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// Cache or history store errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Generative advisory errors
    #[error("Advisory model error: {message}")]
    Llm { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl StepSafeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn llm<S: Into<String>>(message: S) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            StepSafeError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            StepSafeError::Api { .. } => {
                "Unable to reach the weather services. Please check your internet connection."
                    .to_string()
            }
            StepSafeError::Validation { message } => format!("Invalid input: {message}"),
            StepSafeError::LocationNotFound { query } => {
                format!("Could not find a location matching '{query}'.")
            }
            StepSafeError::Cache { .. } => {
                "Local storage failed. You may need to clear your cache directory.".to_string()
            }
            StepSafeError::Llm { .. } => {
                "Could not generate the AI summary. Please try again later.".to_string()
            }
            StepSafeError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
