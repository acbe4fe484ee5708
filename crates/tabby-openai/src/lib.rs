#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Logging target for chat completion client operations.
pub const TRACING_TARGET: &str = "tabby_openai::client";

mod error;

pub mod client;
pub mod completion;

pub use client::{OpenAiClient, OpenAiConfig};
pub use error::{Error, Result};
