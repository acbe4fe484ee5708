//! Configuration for the PaddleX HTTP client.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default base URL of the PaddleX serving endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8866";

/// Default minimum detection score kept by the shelf segmenter.
pub const DEFAULT_MIN_DETECTION_CONFIDENCE: f32 = 0.45;

/// Default category index of books in the detection model.
pub const DEFAULT_BOOK_CATEGORY: u32 = 0;

/// Configuration for the PaddleX HTTP client.
///
/// # Examples
///
/// ```ignore
/// use tabby_paddle::PdConfig;
///
/// let config = PdConfig::new("http://paddlex:8080")
///     .with_api_key("secret")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct PdConfig {
    /// Base URL of the PaddleX serving endpoint
    #[cfg_attr(
        feature = "config",
        arg(
            id = "paddle_url",
            long = "paddle-url",
            env = "PADDLE_URL",
            default_value = DEFAULT_BASE_URL
        )
    )]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key for authentication (if required)
    #[cfg_attr(
        feature = "config",
        arg(
            id = "paddle_api_key",
            long = "paddle-api-key",
            env = "PADDLE_API_KEY"
        )
    )]
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            id = "paddle_timeout",
            long = "paddle-timeout",
            env = "PADDLE_TIMEOUT",
            default_value_t = 60
        )
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of retry attempts for retryable errors
    #[cfg_attr(
        feature = "config",
        arg(
            id = "paddle_max_retries",
            long = "paddle-max-retries",
            env = "PADDLE_MAX_RETRIES",
            default_value_t = 2
        )
    )]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Minimum score of a shelf detection
    #[cfg_attr(
        feature = "config",
        arg(
            id = "paddle_min_detection_confidence",
            long = "paddle-min-detection-confidence",
            env = "PADDLE_MIN_DETECTION_CONFIDENCE",
            default_value_t = DEFAULT_MIN_DETECTION_CONFIDENCE
        )
    )]
    #[serde(default = "default_min_detection_confidence")]
    pub min_detection_confidence: f32,

    /// Category index of books in the detection model
    #[cfg_attr(
        feature = "config",
        arg(
            id = "paddle_book_category",
            long = "paddle-book-category",
            env = "PADDLE_BOOK_CATEGORY",
            default_value_t = DEFAULT_BOOK_CATEGORY
        )
    )]
    #[serde(default)]
    pub book_category: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_min_detection_confidence() -> f32 {
    DEFAULT_MIN_DETECTION_CONFIDENCE
}

impl Default for PdConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            min_detection_confidence: default_min_detection_confidence(),
            book_category: DEFAULT_BOOK_CATEGORY,
        }
    }
}

impl PdConfig {
    /// Create a new configuration with the given base URL and default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Get the base delay for linear backoff between retries.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(500)
    }

    /// Get the user agent string.
    pub fn user_agent(&self) -> String {
        format!("tabby-paddle/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the minimum detection score.
    pub fn with_min_detection_confidence(mut self, confidence: f32) -> Self {
        self.min_detection_confidence = confidence;
        self
    }

    /// Set the book category index.
    pub fn with_book_category(mut self, category: u32) -> Self {
        self.book_category = category;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PdConfig::default();
        assert_eq!(config.base_url, "http://localhost:8866");
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.min_detection_confidence, 0.45);
        assert_eq!(config.book_category, 0);
    }

    #[test]
    fn fluent_api() {
        let config = PdConfig::new("https://paddle.internal")
            .with_api_key("my-key")
            .with_timeout(Duration::from_secs(45))
            .with_max_retries(0)
            .with_min_detection_confidence(0.6)
            .with_book_category(73);

        assert_eq!(config.api_key.as_deref(), Some("my-key"));
        assert_eq!(config.timeout(), Duration::from_secs(45));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.book_category, 73);
    }

    #[test]
    fn zero_timeout_is_raised() {
        let config = PdConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }
}
