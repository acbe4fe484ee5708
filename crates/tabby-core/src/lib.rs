#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for collaborator invocations.
pub const TRACING_TARGET_PROVIDER: &str = "tabby_core::provider";

mod error;

pub mod book;
pub mod candidate;
pub mod completion;
pub mod fragment;
pub mod geometry;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
pub mod provider;
pub mod region;
pub mod search;

pub use book::{Book, BookDetails};
pub use candidate::{CandidateOption, CandidateSet};
pub use completion::{Choice, Completion, CompletionRequest};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use fragment::RecognizedFragment;
pub use geometry::{Point, Quad, Rotation};
pub use provider::{
    BoxedCatalog, BoxedLanguageModel, BoxedSegmenter, BoxedTextRecognizer, Catalog,
    LanguageModel, ShelfSegmenter, TextRecognizer, find_text,
};
pub use region::{Detection, DetectionBox, SEGMENTER_INPUT_SIZE, SegmenterInput, ShelfRegion};
pub use search::SearchQuery;
