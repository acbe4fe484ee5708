//! Configuration for the chat completions client.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default request timeout: 60 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the chat completions client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    #[cfg_attr(
        feature = "config",
        arg(
            id = "openai_api_key",
            long = "openai-api-key",
            env = "OPENAI_API_KEY"
        )
    )]
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[cfg_attr(
        feature = "config",
        arg(
            id = "openai_base_url",
            long = "openai-base-url",
            env = "OPENAI_BASE_URL",
            default_value = DEFAULT_BASE_URL
        )
    )]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for completions
    #[cfg_attr(
        feature = "config",
        arg(
            id = "openai_model",
            long = "openai-model",
            env = "OPENAI_MODEL",
            default_value = DEFAULT_MODEL
        )
    )]
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            id = "openai_timeout",
            long = "openai-timeout",
            env = "OPENAI_TIMEOUT",
            default_value_t = DEFAULT_TIMEOUT_SECS
        )
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OpenAiConfig {
    /// Creates a configuration with the given API key and defaults otherwise.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::default().with_api_key(api_key)
    }

    /// Returns the effective timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    /// Returns the user agent sent with every request.
    pub fn user_agent(&self) -> String {
        format!("tabby/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
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
    fn defaults() {
        let config = OpenAiConfig::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.effective_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn fluent_api() {
        let config = OpenAiConfig::new("sk-test")
            .with_model("gpt-4o-mini")
            .with_base_url("http://localhost:11434/v1")
            .with_timeout(0);

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.effective_timeout(), Duration::from_secs(60));
    }
}
