//! Error types for the Nylas client.
//!
//! Errors fall into two groups: local errors raised by the client before or after
//! a round-trip (missing attributes, malformed success responses, bad configuration),
//! and transport errors reported by the [`Connection`](crate::connection::Connection).
//! Resource operations pass transport errors through without remapping them.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Nylas operations.
pub type NylasResult<T> = Result<T, NylasError>;

/// Error type for Nylas client operations.
#[derive(Debug, Error)]
pub enum NylasError {
    /// Configuration error (missing access token, invalid base URL, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// A resource attribute required by the operation is not set.
    #[error("Missing required field `{field}`: {message}")]
    MissingField {
        /// Name of the missing attribute.
        field: &'static str,
        /// Human readable hint.
        message: &'static str,
    },

    /// An id that cannot be addressed as a single path segment.
    #[error("Invalid file id `{id}`")]
    InvalidId {
        /// The rejected id.
        id: String,
    },

    /// The upload succeeded but the server returned no file entries.
    #[error("Upload returned no file entries")]
    EmptyUploadResult,

    /// Bad request (invalid request parameters).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from the API.
        message: String,
        /// The error type reported by the API.
        error_type: Option<String>,
    },

    /// Authentication error (invalid or revoked access token).
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message from the API.
        message: String,
    },

    /// Permission denied.
    #[error("Permission denied: {message}")]
    Permission {
        /// Error message from the API.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Error message from the API.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Error message from the API.
        message: String,
        /// Duration to wait before retrying.
        retry_after: Option<Duration>,
    },

    /// Server side failure (5xx).
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Request timeout.
    #[error("Request timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network/connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Error while reading a streamed response body.
    #[error("Stream error: {message}")]
    Stream {
        /// Error message.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Deserialization error: {message}")]
    Deserialization {
        /// Error message.
        message: String,
        /// Raw response body (lossy UTF-8).
        body: String,
    },

    /// Unknown error.
    #[error("Unknown error (HTTP {status}): {message}")]
    Unknown {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Raw response body.
        body: Option<String>,
    },
}

impl NylasError {
    /// Creates a missing field error.
    pub fn missing_field(field: &'static str, message: &'static str) -> Self {
        NylasError::MissingField { field, message }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        NylasError::Configuration {
            message: message.into(),
        }
    }

    /// Returns true if this error was produced locally, without the server's involvement.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            NylasError::Configuration { .. }
                | NylasError::MissingField { .. }
                | NylasError::InvalidId { .. }
                | NylasError::EmptyUploadResult
                | NylasError::Deserialization { .. }
        )
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NylasError::RateLimit { .. }
                | NylasError::Server { .. }
                | NylasError::Timeout { .. }
                | NylasError::Connection { .. }
        )
    }

    /// Returns the retry-after duration if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            NylasError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns the HTTP status code if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NylasError::BadRequest { .. } => Some(400),
            NylasError::Authentication { .. } => Some(401),
            NylasError::Permission { .. } => Some(403),
            NylasError::NotFound { .. } => Some(404),
            NylasError::RateLimit { .. } => Some(429),
            NylasError::Server { status, .. } => Some(*status),
            NylasError::Unknown { status, .. } if *status != 0 => Some(*status),
            _ => None,
        }
    }
}

/// Error body returned by the Nylas API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// The error message.
    pub message: String,
    /// The error type, e.g. `invalid_request_error`.
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}

impl From<reqwest::Error> for NylasError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NylasError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            NylasError::Connection {
                message: err.to_string(),
            }
        } else if err.is_body() || err.is_decode() {
            NylasError::Stream {
                message: err.to_string(),
            }
        } else {
            NylasError::Unknown {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
                body: None,
            }
        }
    }
}

impl From<serde_json::Error> for NylasError {
    fn from(err: serde_json::Error) -> Self {
        NylasError::Deserialization {
            message: err.to_string(),
            body: String::new(),
        }
    }
}

impl From<url::ParseError> for NylasError {
    fn from(err: url::ParseError) -> Self {
        NylasError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
