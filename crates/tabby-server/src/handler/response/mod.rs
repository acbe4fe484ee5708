//! Response types for HTTP handlers.

mod books;
mod error_response;

pub use books::BookResults;
pub use error_response::ErrorResponse;
