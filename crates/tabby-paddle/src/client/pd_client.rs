//! PaddleX HTTP client implementation.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbImage};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{Error, PADDLEX_TARGET, PdConfig, Result};

/// HTTP client for PaddleX serving pipelines.
///
/// One client serves both the OCR and the object detection pipelines; it
/// implements [`tabby_core::TextRecognizer`] and
/// [`tabby_core::ShelfSegmenter`].
///
/// # Examples
///
/// ```ignore
/// use tabby_paddle::{PdClient, PdConfig};
///
/// let client = PdClient::new(PdConfig::new("http://localhost:8866"))?;
/// client.health_check().await?;
/// ```
#[derive(Clone)]
pub struct PdClient {
    /// HTTP client
    http_client: Client,

    /// Parsed base URL, always ending with a slash
    base_url: Url,

    /// Configuration
    config: PdConfig,
}

impl std::fmt::Debug for PdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.config.timeout())
            .finish_non_exhaustive()
    }
}

impl PdClient {
    /// Create a new PaddleX client with the given configuration.
    pub fn new(config: PdConfig) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| Error::config(format!("Invalid base URL '{}': {e}", config.base_url)))?;

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(api_key) = config.api_key.as_deref() {
            let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| Error::config(format!("Invalid API key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        debug!(
            target: PADDLEX_TARGET,
            base_url = %base_url,
            timeout = ?config.timeout(),
            max_retries = config.max_retries,
            "PaddleX client initialized"
        );

        Ok(Self {
            http_client,
            base_url,
            config,
        })
    }

    /// Get a reference to the client configuration.
    pub fn config(&self) -> &PdConfig {
        &self.config
    }

    /// Resolves a pipeline path against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::config(format!("Failed to construct API URL: {e}")))
    }

    /// Calls a pipeline and returns its `result` payload, retrying
    /// retryable failures with a linear backoff.
    pub(crate) async fn infer<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            let result = async {
                let response = self
                    .http_client
                    .post(url.clone())
                    .json(body)
                    .send()
                    .await?;
                self.handle_response(response).await
            }
            .await;

            match result {
                Ok(payload) => {
                    if attempt > 0 {
                        info!(
                            target: PADDLEX_TARGET,
                            attempt = attempt + 1,
                            "Request succeeded after retry"
                        );
                    }
                    return Ok(payload);
                }
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    let backoff = self.config.retry_backoff() * attempt;

                    warn!(
                        target: PADDLEX_TARGET,
                        attempt,
                        max_retries,
                        backoff_ms = backoff.as_millis(),
                        error = %e,
                        "Request failed, retrying"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    error!(
                        target: PADDLEX_TARGET,
                        attempt = attempt + 1,
                        category = e.category(),
                        error = %e,
                        "Request failed permanently"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Handle HTTP response and unwrap the serving envelope.
    async fn handle_response<Resp>(&self, response: reqwest::Response) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        let status = response.status();

        debug!(
            target: PADDLEX_TARGET,
            status = status.as_u16(),
            "Received response from PaddleX"
        );

        if status.is_success() {
            let bytes = response.bytes().await?;
            let envelope: Envelope<Resp> = serde_json::from_slice(&bytes).map_err(|e| {
                Error::invalid_response(format!("Failed to parse success response: {e}"))
            })?;
            return envelope.into_result(status);
        }

        let body_text = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => Error::rate_limit("Rate limit exceeded"),
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                Error::service_unavailable("Service temporarily unavailable")
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                Error::timeout(self.config.timeout())
            }
            _ => match serde_json::from_str::<Envelope<serde_json::Value>>(&body_text) {
                Ok(envelope) => Error::api(status.as_u16(), envelope.error_msg, envelope.error_code),
                Err(_) => Error::api(status.as_u16(), body_text, None),
            },
        })
    }

    /// Health check for the PaddleX service.
    pub async fn health_check(&self) -> Result<()> {
        let url = self.endpoint("health")?;

        debug!(target: PADDLEX_TARGET, url = %url, "Performing health check");

        let response = self.http_client.get(url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::service_unavailable(format!(
                "Health check failed with status {}",
                response.status()
            )))
        }
    }
}

/// Encodes an image as base64 PNG for transport.
pub(crate) fn encode_png(image: &RgbImage) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(STANDARD.encode(buffer.into_inner()))
}

/// PaddleX serving response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_msg: String,
    result: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self, status: StatusCode) -> Result<T> {
        match (self.error_code, self.result) {
            (Some(code), _) if code != 0 => {
                Err(Error::api(status.as_u16(), self.error_msg, Some(code)))
            }
            (_, Some(result)) => Ok(result),
            (_, None) => Err(Error::invalid_response("Response carried no result")),
        }
    }
}
