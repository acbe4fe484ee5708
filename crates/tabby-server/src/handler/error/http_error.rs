//! Errors returned by handlers and extractors.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// Tracing target for error responses.
const TRACING_TARGET: &str = "tabby_server::handler::error";

/// Category of a handler error; selects the status code and default message.
#[must_use]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed image, query or body.
    BadRequest,
    /// Unknown route.
    NotFound,
    /// Body over the configured limit.
    PayloadTooLarge,
    #[default]
    InternalServerError,
    /// A collaborator could not be reached.
    ServiceUnavailable,
    /// A collaborator or the whole request ran out of time.
    GatewayTimeout,
}

impl ErrorKind {
    /// Status code sent for this kind.
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Machine-readable name sent in the body.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::PayloadTooLarge => "payload_too_large",
            Self::InternalServerError => "internal_server_error",
            Self::ServiceUnavailable => "service_unavailable",
            Self::GatewayTimeout => "gateway_timeout",
        }
    }

    /// Message used when the error carries none of its own.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Invalid request data.",
            Self::NotFound => "Resource not found.",
            Self::PayloadTooLarge => "Payload too large.",
            Self::InternalServerError => "Internal server error.",
            Self::ServiceUnavailable => "Service unavailable.",
            Self::GatewayTimeout => "Request timed out.",
        }
    }

    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_resource<'a>(self, resource: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_resource(resource)
    }

    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}

/// Error produced while handling a request.
///
/// The message and resource are sent to the client. The context is only
/// logged.
#[must_use = "errors do nothing unless returned"]
#[derive(Debug, Clone, Default)]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    resource: Option<Cow<'a, str>>,
    context: Option<Cow<'a, str>>,
}

impl Error<'_> {
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            resource: None,
            context: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Replaces the kind's default message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names the part of the request at fault.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attaches diagnostic detail for the logs.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Custom message, if one was set.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    fn body(&self) -> ErrorResponse<'_> {
        let message = self.message().unwrap_or(self.kind.default_message());
        let body = ErrorResponse::new(self.kind.name(), message);

        match self.resource.as_deref() {
            Some(resource) => body.with_resource(resource),
            None => body,
        }
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message().unwrap_or(self.kind.default_message());
        write!(f, "{} ({}): {message}", self.kind, self.kind.status())?;

        if let Some(context) = self.context() {
            write!(f, " - {context}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let status = self.kind.status();

        if status.is_server_error() {
            tracing::warn!(
                target: TRACING_TARGET,
                status = %status,
                error = %self,
                "request failed"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET,
                status = %status,
                error = %self,
                resource = self.resource.as_deref(),
                "request rejected"
            );
        }

        self.body().into_response_with(status)
    }
}

impl aide::OperationOutput for Error<'_> {
    type Inner = ErrorResponse<'static>;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        <axum::Json<ErrorResponse<'static>> as aide::OperationOutput>::operation_response(
            ctx, operation,
        )
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result returned by handlers.
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;
