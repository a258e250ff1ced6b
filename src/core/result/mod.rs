//! Transcript result retrieval and confidence aggregation.

mod document;
mod fetcher;

pub use document::{
    ItemAlternative, PRONUNCIATION_ITEM, ResultItem, TranscriptDocument, TranscriptResults,
    TranscriptText,
};
pub use fetcher::{HttpResultFetcher, ResultFetcher};
