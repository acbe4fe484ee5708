//! Request timeouts and panic recovery.

use std::any::Any;
use std::future::ready;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets::{RECOVERY_ERROR, RECOVERY_PANIC};

type ResponseFut = BoxFuture<'static, Response>;
type Panic = Box<dyn Any + Send + 'static>;

/// Default request timeout: 120 seconds.
///
/// A shelf scan runs several recognition and completion calls per region.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Configuration for recovery middleware behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Maximum duration in seconds to wait for a request to complete before timing out.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)
    )]
    pub request_timeout: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl RecoveryConfig {
    /// Creates a new configuration with the specified request timeout in seconds.
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            request_timeout: secs,
        }
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Extension trait for `axum::`[`Router`] to apply recovery middleware.
pub trait RouterRecoveryExt<S> {
    /// Layers timeout and panic recovery with the provided configuration.
    ///
    /// Timed out requests receive `504 Gateway Timeout`, panics in handlers
    /// `500 Internal Server Error`.
    fn with_recovery(self, config: &RecoveryConfig) -> Self;

    /// Layers recovery middleware with default configuration.
    fn with_default_recovery(self) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        let middlewares = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .layer(CatchPanicLayer::custom(catch_panic))
            .layer(TimeoutLayer::new(config.request_timeout()));

        self.layer(middlewares)
    }

    fn with_default_recovery(self) -> Self {
        self.with_recovery(&RecoveryConfig::default())
    }
}

/// Message sent when a scan outlives the request timeout.
const TIMED_OUT: &str = "The scan took too long and was cancelled.";

/// Message sent when a handler panics.
const PANICKED: &str = "An unexpected panic occurred";

fn handle_error(err: tower::BoxError) -> ResponseFut {
    let error = match err.downcast::<Elapsed>() {
        Ok(_) => {
            tracing::warn!(target: RECOVERY_ERROR, "request timeout exceeded");
            ErrorKind::GatewayTimeout.with_message(TIMED_OUT)
        }
        Err(err) => {
            tracing::error!(
                target: RECOVERY_ERROR,
                error = %err,
                "middleware failed"
            );
            Error::new(ErrorKind::InternalServerError).with_context(err.to_string())
        }
    };

    ready(error.into_response()).boxed()
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &Panic) -> &str {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else {
        "non-string panic payload"
    }
}

fn catch_panic(payload: Panic) -> Response {
    tracing::error!(
        target: RECOVERY_PANIC,
        panic = panic_message(&payload),
        "handler panicked"
    );

    ErrorKind::InternalServerError
        .with_message(PANICKED)
        .into_response()
}
