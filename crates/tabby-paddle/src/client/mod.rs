//! PaddleX HTTP client module.

mod pd_client;
mod pd_config;

pub(crate) use pd_client::encode_png;
pub use pd_client::PdClient;
pub use pd_config::{
    DEFAULT_BASE_URL, DEFAULT_BOOK_CATEGORY, DEFAULT_MIN_DETECTION_CONFIDENCE, PdConfig,
};
