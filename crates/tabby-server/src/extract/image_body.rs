//! Binary image body extractor.

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use bytes::Bytes;
use derive_more::{Deref, From};
use image::RgbImage;

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets::EXTRACT as TRACING_TARGET;

/// Message returned when the body is not a decodable image.
pub const COULD_NOT_READ_IMAGE: &str = "Couldn't read an image from the given body.";

/// Request body decoded into an RGB image.
///
/// The format is guessed from the content (JPEG, PNG and every other format
/// enabled in `image`); the `Content-Type` header is ignored.
#[must_use]
#[derive(Debug, Clone, Deref, From)]
pub struct ImageBody(pub RgbImage);

impl ImageBody {
    /// Decodes `bytes` into an RGB image.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error<'static>> {
        let image = image::load_from_memory(bytes).map_err(|err| {
            tracing::debug!(
                target: TRACING_TARGET,
                error = %err,
                body_len = bytes.len(),
                "image body rejected"
            );

            ErrorKind::BadRequest
                .with_message(COULD_NOT_READ_IMAGE)
                .with_resource("image")
                .with_context(err.to_string())
        })?;

        Ok(Self(image.to_rgb8()))
    }

    /// Returns the decoded image.
    #[inline]
    pub fn into_inner(self) -> RgbImage {
        self.0
    }
}

impl<S> FromRequest<S> for ImageBody
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            let kind = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => ErrorKind::PayloadTooLarge,
                _ => ErrorKind::BadRequest,
            };
            kind.with_context(rejection.body_text())
        })?;

        let decoded = tokio::task::spawn_blocking(move || Self::decode(&bytes))
            .await
            .map_err(|err| {
                ErrorKind::InternalServerError
                    .with_message("Image decoding failed")
                    .with_context(err.to_string())
            })??;

        tracing::debug!(
            target: TRACING_TARGET,
            width = decoded.width(),
            height = decoded.height(),
            "image body decoded"
        );

        Ok(decoded)
    }
}

impl aide::OperationInput for ImageBody {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        <Bytes as aide::OperationInput>::operation_input(ctx, operation);
    }
}
