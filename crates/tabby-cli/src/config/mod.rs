//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # CORS, OpenAPI, request timeout
//! ├── service: ServiceConfig        # ISBN filter, collaborator timeout
//! ├── paddle: PdConfig              # Text recognition and shelf segmentation
//! ├── openai: OpenAiConfig          # Chat completions
//! └── books: BooksConfig            # Google Books catalog
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod middleware;
mod provider;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use middleware::MiddlewareConfig;
pub use provider::create_collaborators;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tabby_books::BooksConfig;
use tabby_openai::OpenAiConfig;
use tabby_paddle::PdConfig;
use tabby_server::service::ServiceConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "tabby")]
#[command(about = "Tabby book identification server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, OpenAPI, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Identification pipeline configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// PaddleX serving configuration.
    #[clap(flatten)]
    pub paddle: PdConfig,

    /// Chat completions configuration.
    #[clap(flatten)]
    pub openai: OpenAiConfig,

    /// Google Books configuration.
    #[clap(flatten)]
    pub books: BooksConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so clap's `env` lookups see its values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        anyhow::ensure!(
            self.service.shelf_budget_secs < self.middleware.recovery.request_timeout,
            "shelf budget ({}s) must be shorter than the request timeout ({}s)",
            self.service.shelf_budget_secs,
            self.middleware.recovery.request_timeout,
        );
        Ok(())
    }

    /// Logs configuration (no secrets).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            filter_isbn = self.service.filter_isbn,
            pipeline_timeout_secs = self.service.pipeline_timeout_secs,
            openai_key_set = self.openai.api_key.is_some(),
            books_key_set = self.books.api_key.is_some(),
            paddle_key_set = self.paddle.api_key.is_some(),
            "Pipeline configuration"
        );
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
