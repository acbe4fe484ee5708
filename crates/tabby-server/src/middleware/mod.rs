//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Each concern is an extension trait on the router:
//!
//! ```rust,no_run
//! use aide::axum::ApiRouter;
//! use axum::Router;
//! use tabby_server::middleware::*;
//!
//! let app: Router = ApiRouter::new()
//!     .with_open_api(OpenApiConfig::default())
//!     .with_default_security()
//!     .with_observability()
//!     .with_default_recovery();
//! ```

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, RouterSecurityExt};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
