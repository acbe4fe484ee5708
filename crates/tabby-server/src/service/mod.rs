//! Application state and dependency injection.

mod service_config;

pub use crate::pipeline::Collaborators;
pub use crate::service::service_config::ServiceConfig;
use crate::pipeline::{BookPipeline, IsbnPolicy, TagGenerator};
use crate::utility::tracing_targets::SERVICE as TRACING_TARGET;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pub pipeline: BookPipeline,
    pub tags: TagGenerator,
    pub isbn_policy: IsbnPolicy,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// The collaborators are constructed by the caller and shared by every
    /// request for the lifetime of the process.
    pub fn new(config: &ServiceConfig, collaborators: &Collaborators) -> Result<Self> {
        config.validate()?;

        let pipeline = BookPipeline::new(collaborators, config.pipeline_timeout())?
            .with_shelf_budget(config.shelf_budget());
        let tags = TagGenerator::new(
            collaborators.language_model.clone(),
            config.pipeline_timeout(),
        );

        tracing::info!(
            target: TRACING_TARGET,
            filter_isbn = config.filter_isbn,
            pipeline_timeout_secs = config.pipeline_timeout_secs,
            shelf_budget_secs = config.shelf_budget_secs,
            "service state initialized"
        );

        Ok(Self {
            pipeline,
            tags,
            isbn_policy: config.isbn_policy(),
        })
    }
}

impl std::fmt::Debug for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceState")
            .field("pipeline", &self.pipeline)
            .field("isbn_policy", &self.isbn_policy)
            .finish_non_exhaustive()
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pipeline: BookPipeline);
impl_di!(tags: TagGenerator);
impl_di!(isbn_policy: IsbnPolicy);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::pipeline::test_support::Mocks;

    #[test]
    fn rejects_invalid_configuration() {
        let config = ServiceConfig {
            pipeline_timeout_secs: 0,
            ..ServiceConfig::default()
        };

        let err = ServiceState::new(&config, &Mocks::default().collaborators()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn carries_the_configured_policy() -> anyhow::Result<()> {
        let config = ServiceConfig {
            filter_isbn: false,
            ..ServiceConfig::default()
        };

        let state = ServiceState::new(&config, &Mocks::default().collaborators())?;
        assert!(!state.isbn_policy.requires_isbn());
        Ok(())
    }
}
