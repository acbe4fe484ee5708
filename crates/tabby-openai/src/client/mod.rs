//! Chat completions HTTP client.

mod chat_client;
mod config;

pub use chat_client::OpenAiClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, OpenAiConfig};
