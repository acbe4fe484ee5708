#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing targets for observability
/// Logging target for PaddleX client operations.
pub const PADDLEX_TARGET: &str = "tabby_paddle::client";

/// Logging target for text recognition.
pub const OCR_TARGET: &str = "tabby_paddle::ocr";

/// Logging target for shelf detection.
pub const DETECTION_TARGET: &str = "tabby_paddle::detection";

mod error;

pub mod client;
pub mod detection;
pub mod ocr;

pub use client::{PdClient, PdConfig};
pub use error::{Error, Result};
