//! Chat completions client implementation.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use reqwest::header::HeaderValue;
use tabby_core::{Completion, CompletionRequest, LanguageModel};
use tracing::{debug, warn};
use url::Url;

use super::OpenAiConfig;
use crate::completion::{chat_request, completion};
use crate::{Error, Result, TRACING_TARGET};

/// Client for OpenAI-compatible chat completions.
///
/// # Examples
///
/// ```ignore
/// use tabby_openai::{OpenAiClient, OpenAiConfig};
///
/// let client = OpenAiClient::new(OpenAiConfig::new("sk-..."))?;
/// let completion = client.chat(&request).await?;
/// ```
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    config: OpenAiConfig,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_base = api_base(&config.base_url)?;

        let mut sdk_config = OpenAIConfig::new().with_api_base(api_base.as_str());
        if let Some(api_key) = config.api_key.as_deref() {
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| Error::config(format!("Invalid API key: {e}")))?;
            sdk_config = sdk_config.with_api_key(api_key);
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let client = Client::with_config(sdk_config).with_http_client(http_client);

        debug!(
            target: TRACING_TARGET,
            api_base = %api_base,
            model = %config.model,
            timeout = ?config.effective_timeout(),
            "Chat completions client initialized"
        );

        Ok(Self { client, config })
    }

    /// Get a reference to the client configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Sends one completion request.
    pub async fn chat(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = chat_request(&self.config.model, request)?;

        debug!(
            target: TRACING_TARGET,
            model = %self.config.model,
            user_chars = request.user.len(),
            "Requesting chat completion"
        );

        let response = self.client.chat().create(body).await.map_err(|err| {
            let err = Error::from(err);
            warn!(
                target: TRACING_TARGET,
                category = err.category(),
                error = %err,
                "Chat completion request failed"
            );
            err
        })?;

        debug!(
            target: TRACING_TARGET,
            choices = response.choices.len(),
            "Received chat completion response"
        );

        Ok(completion(response))
    }
}

#[async_trait::async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> tabby_core::Result<Completion> {
        Ok(self.chat(request).await?)
    }
}

/// Validates the base URL and drops any trailing slash, since request
/// paths are appended to it verbatim.
fn api_base(base_url: &str) -> Result<String> {
    Url::parse(base_url)
        .map_err(|e| Error::config(format!("Invalid base URL '{base_url}': {e}")))?;

    Ok(base_url.trim_end_matches('/').to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_keeps_path() {
        assert_eq!(
            api_base("https://api.openai.com/v1").unwrap(),
            "https://api.openai.com/v1"
        );
        assert_eq!(
            api_base("http://localhost:11434/v1/").unwrap(),
            "http://localhost:11434/v1"
        );
    }

    #[test]
    fn invalid_base_url() {
        assert!(matches!(api_base("not a url"), Err(Error::Config { .. })));
    }

    #[test]
    fn client_creation() {
        assert!(OpenAiClient::new(OpenAiConfig::new("sk-test")).is_ok());
        assert!(OpenAiClient::new(OpenAiConfig::new("bad\nkey")).is_err());
        assert!(OpenAiClient::new(OpenAiConfig::default().with_base_url("::")).is_err());
    }
}
