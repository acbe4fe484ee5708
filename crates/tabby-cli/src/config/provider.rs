//! Collaborator construction.

use std::sync::Arc;

use anyhow::Context;
use tabby_books::BooksClient;
use tabby_openai::OpenAiClient;
use tabby_paddle::PdClient;
use tabby_server::service::Collaborators;

use super::Cli;
use crate::TRACING_TARGET_CONFIG;

/// Creates every collaborator client from CLI configuration.
///
/// A single PaddleX client serves both text recognition and shelf
/// segmentation. An unreachable PaddleX server is logged but doesn't stop
/// startup; scans degrade to empty results until it comes up.
pub async fn create_collaborators(cli: &Cli) -> anyhow::Result<Collaborators> {
    let paddle = Arc::new(
        PdClient::new(cli.paddle.clone()).context("failed to create PaddleX client")?,
    );
    if let Err(err) = paddle.health_check().await {
        tracing::warn!(
            target: TRACING_TARGET_CONFIG,
            paddle_url = %cli.paddle.base_url,
            error = %err,
            "PaddleX health check failed"
        );
    }

    let openai =
        OpenAiClient::new(cli.openai.clone()).context("failed to create chat completions client")?;
    let books =
        BooksClient::new(cli.books.clone()).context("failed to create Google Books client")?;

    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        paddle_url = %cli.paddle.base_url,
        openai_model = %cli.openai.model,
        books_url = %cli.books.books_url,
        "Collaborator clients created"
    );

    Ok(Collaborators {
        recognizer: paddle.clone(),
        segmenter: paddle,
        language_model: Arc::new(openai),
        catalog: Arc::new(books),
    })
}
