//! Error types for the chat completions client.

use async_openai::error::{ApiError, OpenAIError};

/// Result type for all chat completion operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes when talking to a chat completions endpoint.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error ({}): {message}", .kind.as_deref().unwrap_or("unknown"))]
    Api {
        /// Error type reported by the API
        kind: Option<String>,
        /// Error message from the API
        message: String,
    },

    /// The API key was rejected
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Message from the API
        message: String,
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

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// The offending setting
        message: String,
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
    /// Error response from the API.
    pub fn api(kind: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            kind,
            message: message.into(),
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

    /// Get the HTTP status code if this is a transport error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short label used as a log field.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Api { .. } => "api",
            Error::Authentication { .. } => "authentication",
            Error::InvalidResponse { .. } => "invalid_response",
            Error::Serialization(_) => "serialization",
            Error::Config { .. } => "config",
            Error::RateLimit { .. } => "rate_limit",
            Error::ServiceUnavailable { .. } => "service_unavailable",
        }
    }
}

impl From<OpenAIError> for Error {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::Reqwest(err) => Self::Http(err),
            OpenAIError::ApiError(err) => Self::from(err),
            OpenAIError::JSONDeserialize(err) => Self::Serialization(err),
            OpenAIError::InvalidArgument(message) => Self::Config { message },
            other => Self::invalid_response(other.to_string()),
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        let ApiError {
            message,
            r#type,
            code,
            ..
        } = err;

        match (r#type.as_deref(), code.as_deref()) {
            (_, Some("invalid_api_key")) | (Some("authentication_error"), _) => {
                Self::Authentication { message }
            }
            (Some("insufficient_quota" | "requests" | "tokens"), _)
            | (_, Some("rate_limit_exceeded")) => Self::RateLimit { message },
            (Some("server_error"), _) => Self::ServiceUnavailable { message },
            _ => Self::api(r#type, message),
        }
    }
}

impl From<Error> for tabby_core::Error {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        let base = match &err {
            Error::Http(e) if e.is_timeout() => tabby_core::Error::timeout(),
            Error::Http(_) => tabby_core::Error::network_error(),
            Error::Api { .. } | Error::InvalidResponse { .. } => {
                tabby_core::Error::external_error()
            }
            Error::ServiceUnavailable { .. } => tabby_core::Error::external_error(),
            Error::Authentication { .. } => tabby_core::Error::authentication(),
            Error::Serialization(_) => tabby_core::Error::serialization(),
            Error::Config { .. } => tabby_core::Error::configuration(),
            Error::RateLimit { .. } => tabby_core::Error::rate_limited(),
        };

        base.with_message(message).with_source(err)
    }
}
