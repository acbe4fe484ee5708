//! Google Books client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default volumes endpoint.
pub const DEFAULT_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Default cap on results per query (the endpoint's maximum).
pub const DEFAULT_MAX_RESULTS: u32 = 40;

/// Default timeout for catalog requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Google Books client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct BooksConfig {
    /// Volumes search endpoint
    #[cfg_attr(
        feature = "config",
        arg(
            id = "google_books_url",
            long = "google-books-url",
            env = "GOOGLE_BOOKS_URL",
            default_value = DEFAULT_BOOKS_URL
        )
    )]
    #[serde(default = "default_books_url")]
    pub books_url: String,

    /// Google Cloud API key sent with every query
    #[cfg_attr(
        feature = "config",
        arg(
            id = "google_cloud_api_key",
            long = "google-cloud-api-key",
            env = "GOOGLE_CLOUD_API_KEY"
        )
    )]
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum number of results requested per query (1..=40)
    #[cfg_attr(
        feature = "config",
        arg(
            id = "google_books_max_results",
            long = "google-books-max-results",
            env = "GOOGLE_BOOKS_MAX_RESULTS",
            default_value_t = DEFAULT_MAX_RESULTS
        )
    )]
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Catalog request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            id = "google_books_timeout",
            long = "google-books-timeout",
            env = "GOOGLE_BOOKS_TIMEOUT",
            default_value_t = DEFAULT_TIMEOUT_SECS
        )
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_books_url() -> String {
    DEFAULT_BOOKS_URL.to_owned()
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            books_url: default_books_url(),
            api_key: None,
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BooksConfig {
    /// Returns the effective timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    /// Returns the result cap clamped into the endpoint's accepted range.
    pub fn effective_max_results(&self) -> u32 {
        self.max_results.clamp(1, DEFAULT_MAX_RESULTS)
    }

    /// Returns the user agent sent with every request.
    pub fn user_agent(&self) -> String {
        format!("tabby/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the volumes endpoint.
    #[must_use]
    pub fn with_books_url(mut self, books_url: impl Into<String>) -> Self {
        self.books_url = books_url.into();
        self
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the result cap.
    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = BooksConfig::default();
        assert_eq!(config.books_url, DEFAULT_BOOKS_URL);
        assert_eq!(config.max_results, 40);
        assert!(config.api_key.is_none());
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn effective_values_fall_back() {
        let config = BooksConfig::default().with_timeout(0).with_max_results(500);
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
        assert_eq!(config.effective_max_results(), 40);
        assert_eq!(config.with_max_results(0).effective_max_results(), 1);
    }

    #[test]
    fn user_agent_names_the_project() {
        assert!(BooksConfig::default().user_agent().starts_with("tabby/"));
    }
}
