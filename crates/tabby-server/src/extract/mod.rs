//! Request extractors with descriptive rejections.
//!
//! Drop-in replacements for their axum counterparts whose rejections are
//! rendered through the server's JSON error model.
//!
//! - [`Json`]: JSON deserialization with detailed error messages
//! - [`ValidateJson`]: JSON extraction followed by `validator` checks
//! - [`Query`]: query string extraction with parameter context
//! - [`ImageBody`]: binary body decoded into an RGB image

mod image_body;
pub mod reject;

pub use crate::extract::image_body::{COULD_NOT_READ_IMAGE, ImageBody};
pub use crate::extract::reject::{Json, Query, ValidateJson};
