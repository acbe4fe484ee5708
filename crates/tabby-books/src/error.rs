//! Error types for the Google Books client.

use thiserror::Error;

/// Result type alias for catalog client operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for catalog client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<Error> for tabby_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    tabby_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    tabby_core::Error::network_error()
                        .with_message("Connection to the catalog failed")
                        .with_source(e)
                } else {
                    tabby_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => tabby_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Config(message) => tabby_core::Error::configuration().with_message(message),
        }
    }
}
