#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use tabby_server::handler::routes;
use tabby_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
};
use tabby_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig, create_collaborators};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "tabby_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "tabby_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "tabby_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing();

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting tabby server"
    );

    cli.log();
    cli.validate()?;

    let collaborators = create_collaborators(&cli)
        .await
        .context("failed to create collaborators")?;
    let state = ServiceState::new(&cli.service, &collaborators)
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS, body limits, hardening headers
/// 4. Routes (innermost) - OpenAPI documentation and request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    let api_routes: Router = routes()
        .with_state(state)
        .with_open_api(middleware.openapi.clone());

    api_routes
        .with_security(&middleware.cors)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
