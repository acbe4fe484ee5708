//! Centralized tracing target constants for structured logging.
//!
//! Filtering on these targets (for example
//! `RUST_LOG=tabby_server::pipeline=debug`) narrows output to one stage.

/// Candidate extraction through the language model.
pub const EXTRACTION: &str = "tabby_server::pipeline::extraction";

/// Search tag generation for recommendations.
pub const TAGS: &str = "tabby_server::pipeline::tags";

/// Catalog lookups issued by the pipeline.
pub const CATALOG: &str = "tabby_server::pipeline::catalog";

/// Cover scans.
pub const COVER: &str = "tabby_server::pipeline::cover";

/// Shelf scans and region handling.
pub const SHELF: &str = "tabby_server::pipeline::shelf";

/// Request extraction and rejections.
pub const EXTRACT: &str = "tabby_server::extract";

/// Error recovery including middleware errors and request failures.
pub const RECOVERY_ERROR: &str = "tabby_server::recovery::error";

/// Panic recovery including handler panics.
pub const RECOVERY_PANIC: &str = "tabby_server::recovery::panic";

/// Service state construction and configuration.
pub const SERVICE: &str = "tabby_server::service";
