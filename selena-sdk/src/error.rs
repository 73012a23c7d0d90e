//! Error types for the Selena SDK

use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the SDK
pub type Result<T> = std::result::Result<T, SelenaError>;

/// Coarse error category for programmatic branching
///
/// - [`ErrorKind::Validation`] - Bad caller input, nothing was sent
/// - [`ErrorKind::Authentication`] - Fix the API key
/// - [`ErrorKind::Api`] - The endpoint answered with a non-success status
/// - [`ErrorKind::Network`] - Transport failure (timeout, DNS, reset, bad payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Api,
    Network,
}

/// Errors that can occur when using the Selena API
#[derive(Debug, Error)]
pub enum SelenaError {
    /// Caller input was rejected before any I/O
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The API key was rejected
    #[error("{message}")]
    Authentication { message: String, status: u16 },

    /// Classified API failure (rate limit, server error, ...)
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Raw non-success response from the transport, before classification
    #[error("HTTP {status}: {status_text} - {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection, DNS or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SelenaError {
    /// Build a validation error naming the offending field
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        SelenaError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// The category this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            SelenaError::Validation { .. } => ErrorKind::Validation,
            SelenaError::Authentication { .. } => ErrorKind::Authentication,
            SelenaError::Api { .. } | SelenaError::Http { .. } => ErrorKind::Api,
            SelenaError::Timeout(_) | SelenaError::Network(_) | SelenaError::Json(_) => {
                ErrorKind::Network
            }
        }
    }

    /// HTTP status attached to this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SelenaError::Authentication { status, .. } => Some(*status),
            SelenaError::Api { status, .. } => *status,
            SelenaError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Name of the invalid input field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            SelenaError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// Returns true if this is a validation error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Returns true if this is an authentication error
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    /// Returns true if the API rejected the call for rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.kind() == ErrorKind::Api && self.status() == Some(429)
    }

    /// Classify a reqwest failure into a transport error
    pub(crate) fn from_reqwest_error(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            SelenaError::Timeout(timeout)
        } else if err.is_connect() {
            SelenaError::Network(format!("Connection failed: {}", err))
        } else if err.is_request() {
            SelenaError::Network(format!("Request failed: {}", err))
        } else {
            SelenaError::Network(err.to_string())
        }
    }
}
