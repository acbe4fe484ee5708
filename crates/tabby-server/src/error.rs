//! Startup errors.
//!
//! Raised while validating configuration and assembling [`ServiceState`].
//! Request handling uses the HTTP error in [`handler`] instead.
//!
//! [`ServiceState`]: crate::service::ServiceState
//! [`handler`]: crate::handler

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Boxed error that can cross threads.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result of assembling the service.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong while assembling the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A setting is out of range.
    Config,
    /// A collaborator rejected its setup.
    External,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => f.write_str("config"),
            Self::External => f.write_str("collaborator"),
        }
    }
}

/// Error raised before the server starts accepting requests.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// An out-of-range setting.
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: ErrorKind::Config,
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<tabby_core::Error> for Error {
    fn from(err: tabby_core::Error) -> Self {
        let kind = match err.kind() {
            tabby_core::ErrorKind::Configuration => ErrorKind::Config,
            _ => ErrorKind::External,
        };

        Self {
            kind,
            message: err.to_string().into(),
            source: Some(Box::new(err)),
        }
    }
}
