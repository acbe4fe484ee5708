//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! ```rust,no_run
//! use axum::Router;
//! use tabby_server::handler::routes;
//! use tabby_server::service::{Collaborators, ServiceConfig, ServiceState};
//!
//! # fn example(collaborators: Collaborators) -> anyhow::Result<()> {
//! let state = ServiceState::new(&ServiceConfig::default(), &collaborators)?;
//! let app: Router = routes().with_state(state).into();
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod books;
mod error;
mod request;
mod response;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::books::{MISSING_SEARCH_PARAMETER, NO_TAGS};
pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::{RecommendationsRequest, SearchParams};
pub use crate::handler::response::{BookResults, ErrorResponse};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new().merge(books::routes()).fallback(handler)
}
