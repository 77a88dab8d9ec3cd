//! Source types - web results and the batches the search provider returns

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single web search result.
///
/// `url` is the identity key used for deduplication. `content` holds the
/// provider's short relevant-content excerpt; `raw_content` holds the
/// full page text when the provider was asked for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRecord {
    /// Identity key
    pub url: String,

    /// Human-readable title
    pub title: String,

    /// Short relevant content excerpt (replaced by the summary after the
    /// summarization stage)
    pub content: String,

    /// Full page text, when requested from the provider
    #[serde(default)]
    pub raw_content: Option<String>,
}

impl SourceRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: content.into(),
            raw_content: None,
        }
    }

    /// Builder: set raw content
    pub fn with_raw_content(mut self, raw_content: impl Into<String>) -> Self {
        self.raw_content = Some(raw_content.into());
        self
    }
}

/// The result of one search call.
///
/// Providers have drifted between a keyed `{"results": [...]}` object and a
/// bare array over time; both shapes are accepted, and a single sequence may
/// mix them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchBatch {
    /// `{"results": [...]}` response shape
    Keyed { results: Vec<SourceRecord> },
    /// Bare array response shape
    Bare(Vec<SourceRecord>),
}

impl SearchBatch {
    /// The records in this batch, in provider order
    pub fn records(&self) -> &[SourceRecord] {
        match self {
            SearchBatch::Keyed { results } => results,
            SearchBatch::Bare(records) => records,
        }
    }

    pub fn into_records(self) -> Vec<SourceRecord> {
        match self {
            SearchBatch::Keyed { results } => results,
            SearchBatch::Bare(records) => records,
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

impl From<Vec<SourceRecord>> for SearchBatch {
    fn from(records: Vec<SourceRecord>) -> Self {
        SearchBatch::Bare(records)
    }
}

/// Ordered url -> record mapping; insertion order is first-seen order across
/// the concatenated batches.
pub type UniqueSourceMap = IndexMap<String, SourceRecord>;
