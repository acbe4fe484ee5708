//! Middleware configuration for the HTTP server.
//!
//! All middleware configs are re-exported from `tabby-server` and support
//! both CLI arguments and environment variables.
//!
//! ```bash
//! CORS_ORIGINS="https://tabby.example.com" REQUEST_TIMEOUT=60 tabby
//! ```

use anyhow::ensure;
use clap::Args;
use serde::{Deserialize, Serialize};
use tabby_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig};

use crate::TRACING_TARGET_CONFIG;

/// Longest accepted request timeout, in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Middleware configuration combining CORS, OpenAPI, and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// OpenAPI documentation configuration.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    /// Recovery middleware configuration.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Validates the request timeout.
    pub fn validate(&self) -> anyhow::Result<()> {
        let timeout = self.recovery.request_timeout;
        ensure!(
            (1..=MAX_REQUEST_TIMEOUT_SECS).contains(&timeout),
            "request timeout must be 1-{MAX_REQUEST_TIMEOUT_SECS} seconds, got {timeout}"
        );
        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            "OpenAPI configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}
