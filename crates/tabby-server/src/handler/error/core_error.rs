//! Conversion of collaborator errors into HTTP errors.

use crate::handler::{Error, ErrorKind};

impl From<tabby_core::Error> for Error<'static> {
    fn from(error: tabby_core::Error) -> Self {
        use tabby_core::ErrorKind as CoreKind;

        let kind = match error.kind() {
            CoreKind::InvalidInput | CoreKind::Image => ErrorKind::BadRequest,
            CoreKind::Timeout => ErrorKind::GatewayTimeout,
            CoreKind::NetworkError
            | CoreKind::RateLimited
            | CoreKind::Authentication
            | CoreKind::ExternalError => ErrorKind::ServiceUnavailable,
            CoreKind::Configuration | CoreKind::Serialization => ErrorKind::InternalServerError,
        };

        kind.with_context(error.to_string())
    }
}
