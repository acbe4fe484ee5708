//! Error types for PaddleX operations.

use std::time::Duration;

/// Result type for all PaddleX operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes when interacting with PaddleX serving pipelines.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response or a non-zero error code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
        /// Pipeline error code, if the envelope carried one
        code: Option<i64>,
    },

    /// Response body did not have the expected shape.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// What was missing or malformed
        message: String,
    },

    /// JSON (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Image could not be encoded for transport
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// The offending setting
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// Configured limit
        timeout: Duration,
    },

    /// Rate limiting errors
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Message from the service
        message: String,
    },

    /// Service unavailable
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Message from the service
        message: String,
    },
}

impl Error {
    /// Non-success status from the API.
    pub fn api(status: u16, message: impl Into<String>, code: Option<i64>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            code,
        }
    }

    /// Response body did not have the expected shape.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Invalid client setting.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Request ran past `timeout`.
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    /// The service asked us to slow down.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// The service is temporarily down.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout { .. } | Error::RateLimit { .. } | Error::ServiceUnavailable { .. } => {
                true
            }
            Error::Http(err) => err.is_timeout() || err.is_connect(),
            Error::Api { status, .. } => matches!(*status, 429 | 500..=599),
            Error::Serialization(_)
            | Error::Image(_)
            | Error::Config { .. }
            | Error::InvalidResponse { .. } => false,
        }
    }

    /// Short label used as a log field.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Api { .. } => "api",
            Error::InvalidResponse { .. } => "invalid_response",
            Error::Serialization(_) => "serialization",
            Error::Image(_) => "image",
            Error::Config { .. } => "config",
            Error::Timeout { .. } => "timeout",
            Error::RateLimit { .. } => "rate_limit",
            Error::ServiceUnavailable { .. } => "service_unavailable",
        }
    }
}

impl From<Error> for tabby_core::Error {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        let base = match &err {
            Error::Http(e) if e.is_timeout() => tabby_core::Error::timeout(),
            Error::Http(_) => tabby_core::Error::network_error(),
            Error::Api { .. } | Error::InvalidResponse { .. } | Error::ServiceUnavailable { .. } => {
                tabby_core::Error::external_error()
            }
            Error::Serialization(_) => tabby_core::Error::serialization(),
            Error::Image(_) => tabby_core::Error::image(),
            Error::Config { .. } => tabby_core::Error::configuration(),
            Error::Timeout { .. } => tabby_core::Error::timeout(),
            Error::RateLimit { .. } => tabby_core::Error::rate_limited(),
        };

        base.with_message(message).with_source(err)
    }
}
