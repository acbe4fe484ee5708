//! Query string extractor.

use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets::EXTRACT as TRACING_TARGET;

/// Query string extractor with descriptive rejections.
///
/// ```rust,no_run
/// use serde::Deserialize;
/// use tabby_server::extract::Query;
///
/// #[derive(Deserialize)]
/// struct SearchParams {
///     phrase: Option<String>,
/// }
///
/// // Route: /books/search?phrase=dune
/// async fn search(Query(params): Query<SearchParams>) {
///     let _ = params.phrase;
/// }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Creates a new [`Query`] wrapper around the provided query parameters.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Consumes the wrapper and returns the inner query parameters.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AxumQuery::<T>::from_request_parts(parts, state)
            .await
            .map(|AxumQuery(query)| Self(query))
            .map_err(Into::into)
    }
}

impl From<QueryRejection> for Error<'static> {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(
            target: TRACING_TARGET,
            error = %rejection,
            "query string rejected"
        );

        let message = match duplicated_parameter(&rejection.body_text()) {
            Some(name) => format!("The query parameter '{name}' was given more than once."),
            None => "The query string could not be parsed.".to_owned(),
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_resource("query")
            .with_context(rejection.body_text())
    }
}

/// Name of the parameter serde reported as duplicated.
fn duplicated_parameter(error: &str) -> Option<&str> {
    let (_, rest) = error.split_once("duplicate field `")?;
    rest.split_once('`').map(|(name, _)| name)
}

impl<T> aide::OperationInput for Query<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        <AxumQuery<T> as aide::OperationInput>::operation_input(ctx, operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_duplicated_parameters() {
        assert_eq!(
            duplicated_parameter("Failed to deserialize query string: duplicate field `phrase`"),
            Some("phrase")
        );
        assert_eq!(duplicated_parameter("invalid type: map"), None);
    }

    #[test]
    fn query_into_inner() {
        let query = Query::new("dune".to_owned());
        assert_eq!(query.into_inner(), "dune");
    }
}
