//! OpenAPI document and Scalar reference UI.
//!
//! The OpenAPI document is generated from aide's [`ApiRouter`] route
//! documentation and served as JSON next to an interactive Scalar UI.
//!
//! ```rust
//! use aide::axum::ApiRouter;
//! use axum::Router;
//! use tabby_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//!
//! let app: Router<()> = ApiRouter::new()
//!     .with_open_api(OpenApiConfig::default());
//! ```
//!
//! [`ApiRouter`]: aide::axum::ApiRouter

use aide::axum::ApiRouter;
use aide::openapi::{Info, License, OpenApi};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default path of the OpenAPI document.
pub const DEFAULT_OPENAPI_JSON_PATH: &str = "/api/openapi.json";

/// Default path of the Scalar reference UI.
pub const DEFAULT_SCALAR_PATH: &str = "/api/scalar";

/// Paths where the API documentation is mounted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path of the generated OpenAPI document.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = DEFAULT_OPENAPI_JSON_PATH)
    )]
    pub open_api_json: String,

    /// Path of the Scalar reference UI.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = DEFAULT_SCALAR_PATH)
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: DEFAULT_OPENAPI_JSON_PATH.to_owned(),
            scalar_ui: DEFAULT_SCALAR_PATH.to_owned(),
        }
    }
}

/// Document metadata for the book endpoints.
fn tabby_info() -> Info {
    Info {
        title: "Tabby API".to_owned(),
        summary: Some("Book identification from cover and shelf photos".to_owned()),
        description: Some(
            "Identifies books from a photo of one cover or a whole shelf, searches the \
            catalog by phrase or structured fields, and recommends books similar to a \
            weighted list of titles."
                .to_owned(),
        ),
        license: Some(License {
            name: "MIT".to_owned(),
            identifier: Some("MIT".to_owned()),
            ..License::default()
        }),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        ..Info::default()
    }
}

async fn openapi_document(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
    Json(api)
}

/// Finishes an [`ApiRouter`] into a plain router that also serves its docs.
///
/// [`ApiRouter`]: aide::axum::ApiRouter
pub trait RouterOpenApiExt<S> {
    /// Serves the documentation with Tabby's document metadata.
    fn with_open_api(self, config: OpenApiConfig) -> Router<S>;

    /// Serves the documentation with caller-provided metadata.
    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: OpenApiConfig) -> Router<S> {
        self.with_open_api_info(config, tabby_info())
    }

    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S> {
        let mut api = OpenApi {
            info,
            ..OpenApi::default()
        };

        let docs = Scalar::new(&config.open_api_json).axum_route();
        self.route(&config.scalar_ui, docs)
            .route(&config.open_api_json, get(openapi_document))
            .finish_api(&mut api)
            .layer(Extension(api))
    }
}
