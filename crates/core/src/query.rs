//! Search query types - what the query writer produces and the gateway consumes

use serde::{Deserialize, Serialize};

/// A structured web search query.
///
/// `aspect` and `rationale` document which facet of the topic the query
/// covers and why it was generated; only `search_query` is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    /// The query string to execute against the search provider
    pub search_query: String,

    /// Which aspect of the topic the query aims to cover
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<String>,

    /// Reasoning for generating this query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl SearchQuery {
    /// Create a query with only the search text
    pub fn new(search_query: impl Into<String>) -> Self {
        Self {
            search_query: search_query.into(),
            aspect: None,
            rationale: None,
        }
    }

    /// Builder: set aspect
    pub fn with_aspect(mut self, aspect: impl Into<String>) -> Self {
        self.aspect = Some(aspect.into());
        self
    }

    /// Builder: set rationale
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// JSON envelope the query-writer model returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Queries {
    pub queries: Vec<SearchQuery>,
}
