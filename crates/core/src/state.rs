//! Pipeline state - the caller-owned aggregate threaded through a run

use serde::{Deserialize, Serialize};

use crate::query::SearchQuery;
use crate::source::UniqueSourceMap;
use crate::usage::UsageLedger;

/// Pipeline stages recorded in the execution trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    QueryWriter,
    WebSearch,
}

impl PipelineStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::QueryWriter => "query_writer",
            PipelineStep::WebSearch => "web_search",
        }
    }
}

/// The aggregate a pipeline run consumes and returns.
///
/// A run takes the state by value and hands back the updated value, so a
/// caller either gets a fully updated state or an error, never a
/// half-updated one. One state instance must not be driven by two
/// concurrent runs; runs over different instances share nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Research topic driving query generation and summarization
    pub topic: String,

    /// Queries to fan out to the search provider
    pub search_queries: Vec<SearchQuery>,

    /// Formatted context string, set by the formatting stage
    pub source_str: Option<String>,

    /// Deduplicated sources; after summarization each record's content
    /// holds its summary and raw_content is dropped
    pub unique_sources: Option<UniqueSourceMap>,

    /// Per-model token totals, mutated additively and never reset mid-run
    pub token_usage: UsageLedger,

    /// Execution trace, appended to as stages complete
    pub steps: Vec<PipelineStep>,
}

impl PipelineState {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            search_queries: Vec::new(),
            source_str: None,
            unique_sources: None,
            token_usage: UsageLedger::new(),
            steps: Vec::new(),
        }
    }

    /// Builder: set search queries
    pub fn with_queries(mut self, queries: Vec<SearchQuery>) -> Self {
        self.search_queries = queries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_empty() {
        let state = PipelineState::new("rust web frameworks");
        assert_eq!(state.topic, "rust web frameworks");
        assert!(state.search_queries.is_empty());
        assert!(state.source_str.is_none());
        assert!(state.unique_sources.is_none());
        assert!(state.token_usage.is_empty());
        assert!(state.steps.is_empty());
    }

    #[test]
    fn step_names_are_stable() {
        assert_eq!(PipelineStep::QueryWriter.as_str(), "query_writer");
        assert_eq!(PipelineStep::WebSearch.as_str(), "web_search");
    }
}
