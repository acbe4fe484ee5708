#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for catalog client operations.
pub const TRACING_TARGET_CLIENT: &str = "tabby_books::client";

/// Tracing target for query assembly.
pub const TRACING_TARGET_QUERY: &str = "tabby_books::query";

mod error;

pub mod client;
pub mod query;
pub mod volume;

pub use client::{BooksClient, BooksConfig};
pub use error::{Error, Result};
pub use query::{assemble, sanitize};
pub use volume::{VolumeInfo, Volumes};
