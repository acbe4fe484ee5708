//! Google Books volumes client.

use std::sync::Arc;

use reqwest::{Client, Response};
use tabby_core::{Book, Catalog, SearchQuery};
use url::Url;

use super::BooksConfig;
use crate::volume::Volumes;
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_QUERY, query};

struct BooksClientInner {
    http: Client,
    books_url: Url,
    config: BooksConfig,
}

/// HTTP client for the Google Books volumes endpoint.
///
/// Implements [`Catalog`]. The client is cheap to clone.
///
/// # Examples
///
/// ```rust,ignore
/// use tabby_books::{BooksClient, BooksConfig};
/// use tabby_core::{Catalog, SearchQuery};
///
/// let client = BooksClient::new(BooksConfig::default().with_api_key("key"))?;
/// let books = client.search(&SearchQuery::from_phrase("the giver")).await?;
/// ```
#[derive(Clone)]
pub struct BooksClient {
    inner: Arc<BooksClientInner>,
}

impl std::fmt::Debug for BooksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BooksClient")
            .field("books_url", &self.inner.books_url.as_str())
            .field("max_results", &self.inner.config.max_results)
            .finish_non_exhaustive()
    }
}

impl BooksClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: BooksConfig) -> Result<Self> {
        let books_url = Url::parse(&config.books_url)
            .map_err(|e| Error::config(format!("Invalid books URL '{}': {e}", config.books_url)))?;

        let timeout = config.effective_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            books_url = %books_url,
            timeout_ms = timeout.as_millis(),
            has_api_key = config.api_key.is_some(),
            "Google Books client created"
        );

        Ok(Self {
            inner: Arc::new(BooksClientInner {
                http,
                books_url,
                config,
            }),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &BooksConfig {
        &self.inner.config
    }

    /// Builds the request URL for an assembled query string.
    fn request_url(&self, assembled: &str) -> Url {
        let config = self.config();
        let mut url = self.inner.books_url.clone();

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", assembled);
            pairs.append_pair("maxResults", &config.effective_max_results().to_string());
            if let Some(key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
                pairs.append_pair("key", key);
            }
        }

        url
    }

    /// Reads a volumes response, treating any non-2xx status as zero results.
    async fn handle_response(response: Response) -> Result<Vec<Book>> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                body = %body,
                "Catalog returned an unsuccessful status"
            );
            return Ok(Vec::new());
        }

        let bytes = response.bytes().await?;
        let volumes: Volumes = serde_json::from_slice(&bytes)?;
        let books = volumes.into_books();

        if books.is_empty() {
            tracing::info!(target: TRACING_TARGET_CLIENT, "No items found in catalog response");
        }

        Ok(books)
    }
}

#[async_trait::async_trait]
impl Catalog for BooksClient {
    async fn search(&self, query: &SearchQuery) -> tabby_core::Result<Vec<Book>> {
        let assembled = query::assemble(query);
        tracing::info!(target: TRACING_TARGET_QUERY, query = %assembled, "Searching catalog");

        let response = self
            .inner
            .http
            .get(self.request_url(&assembled))
            .send()
            .await
            .map_err(Error::from)?;

        let books = Self::handle_response(response).await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            results = books.len(),
            "Catalog search completed"
        );

        Ok(books)
    }
}
