//! JSON body shared by every error response.

use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::Serialize;

/// Error payload returned to clients.
///
/// Collaborator details stay in the logs; only a stable name, a readable
/// message and the offending part of the request reach the client.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// Machine-readable error name, e.g. `bad_request`.
    pub name: Cow<'a, str>,
    /// Human-readable description.
    pub message: Cow<'a, str>,
    /// Part of the request the error refers to, e.g. `image` or `query`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
}

impl<'a> ErrorResponse<'a> {
    /// Creates a body without a resource.
    pub fn new(name: impl Into<Cow<'a, str>>, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            resource: None,
        }
    }

    /// Names the part of the request the error refers to.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Sends this body with `status`.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resource_is_omitted_when_unset() -> anyhow::Result<()> {
        let body = ErrorResponse::new("not_found", "Resource not found.");
        assert_eq!(
            serde_json::to_value(&body)?,
            json!({ "name": "not_found", "message": "Resource not found." })
        );
        Ok(())
    }

    #[test]
    fn resource_is_serialized_when_set() -> anyhow::Result<()> {
        let body = ErrorResponse::new("bad_request", "Couldn't read an image from the given body.")
            .with_resource("image");

        let json = serde_json::to_value(&body)?;
        assert_eq!(json["resource"], "image");
        Ok(())
    }
}
