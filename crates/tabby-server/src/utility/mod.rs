//! Utility modules for common functionality across the crate.

pub mod tracing_targets;

/// Maximum size of a JSON request body: 1 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Maximum size of an image request body: 20 MiB.
pub const DEFAULT_MAX_IMAGE_BODY_SIZE: usize = 20 * 1024 * 1024;
