//! Error types and handling for the concierge service

use serde::Serialize;
use thiserror::Error;

/// Machine-readable error codes returned to HTTP clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ConfigInvalid,
    ServiceUnavailable,
    UpstreamFailed,
    InvalidInput,
    NotFound,
    Internal,
}

/// Main error type for the concierge service
#[derive(Error, Debug)]
pub enum ConciergeError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A required collaborator is not configured (e.g. missing credential)
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// External API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Lookup returned no result
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ConciergeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new service-unavailable error
    pub fn service_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ServiceUnavailable {
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

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            ConciergeError::Config { .. } => ErrorCode::ConfigInvalid,
            ConciergeError::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            ConciergeError::Api { .. } => ErrorCode::UpstreamFailed,
            ConciergeError::Validation { .. } => ErrorCode::InvalidInput,
            ConciergeError::NotFound { .. } => ErrorCode::NotFound,
            ConciergeError::Io { .. } => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ConciergeError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            ConciergeError::ServiceUnavailable { message } => message.clone(),
            ConciergeError::Api { .. } => "Failed to generate itinerary".to_string(),
            ConciergeError::Validation { message } => format!("Invalid input: {message}"),
            ConciergeError::NotFound { message } => message.clone(),
            ConciergeError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ConciergeError {
    fn from(err: reqwest::Error) -> Self {
        ConciergeError::api(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for ConciergeError {
    fn from(err: reqwest_middleware::Error) -> Self {
        ConciergeError::api(err.to_string())
    }
}
