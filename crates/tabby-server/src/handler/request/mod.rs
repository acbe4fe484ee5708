//! Request types for HTTP handlers.

mod books;

pub use books::{RecommendationsRequest, SearchParams};
