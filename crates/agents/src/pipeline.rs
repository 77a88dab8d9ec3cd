//! Pipeline orchestrator - validate, search, dedupe, summarize, merge, format.
//!
//! Composes the gateway, deduplicator, summarization fan-out and formatter
//! into one run over a caller-owned [`PipelineState`]. The state is taken by
//! value and returned on success; on failure it is dropped, so the caller
//! never observes a half-updated state. No stage retries, ranks or caches.

use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::search::{search_all, SearchCategory, SearchDepth, SearchOptions, SearchProvider};
use crate::summarize::summarize_all;
use crate::{CompletionClient, Result};
use scout_core::{
    dedupe, format_sources, CoreError, PipelineState, PipelineStep, SourceRecord, UniqueSourceMap,
};

/// Configurable parameters of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub search_category: SearchCategory,
    pub search_depth: SearchDepth,
    /// Recency window for news searches, in days
    pub days_back: u32,
    pub max_results_per_query: usize,
    /// Token budget per source when formatting raw content
    pub max_tokens_per_source: usize,
    pub chunks_per_source: u32,
    pub include_images: bool,
    pub include_image_descriptions: bool,
    pub include_favicon: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search_category: SearchCategory::General,
            search_depth: SearchDepth::Basic,
            days_back: 7,
            max_results_per_query: 5,
            max_tokens_per_source: 1000,
            chunks_per_source: 3,
            include_images: false,
            include_image_descriptions: false,
            include_favicon: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `SCOUT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            search_category: match std::env::var("SCOUT_SEARCH_CATEGORY") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.search_category,
            },
            search_depth: match std::env::var("SCOUT_SEARCH_DEPTH") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.search_depth,
            },
            days_back: env_parse("SCOUT_DAYS_BACK", defaults.days_back),
            max_results_per_query: env_parse(
                "SCOUT_MAX_RESULTS_PER_QUERY",
                defaults.max_results_per_query,
            ),
            max_tokens_per_source: env_parse(
                "SCOUT_MAX_TOKENS_PER_SOURCE",
                defaults.max_tokens_per_source,
            ),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_results_per_query == 0 {
            return Err(
                CoreError::Precondition("max_results_per_query must be > 0".into()).into(),
            );
        }
        if self.max_tokens_per_source == 0 {
            return Err(
                CoreError::Precondition("max_tokens_per_source must be > 0".into()).into(),
            );
        }
        Ok(())
    }

    fn search_options(&self) -> SearchOptions {
        SearchOptions {
            category: self.search_category,
            depth: self.search_depth,
            days_back: self.days_back,
            max_results: self.max_results_per_query,
            include_raw_content: true,
            chunks_per_source: self.chunks_per_source,
            include_images: self.include_images,
            include_image_descriptions: self.include_image_descriptions,
            include_favicon: self.include_favicon,
        }
    }
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

/// The concurrent search-and-summarize pipeline.
pub struct WebSearchPipeline<S, C> {
    search: S,
    llm: C,
    config: PipelineConfig,
}

impl<S: SearchProvider, C: CompletionClient> WebSearchPipeline<S, C> {
    pub fn new(search: S, llm: C, config: PipelineConfig) -> Self {
        Self {
            search,
            llm,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline over `state`.
    ///
    /// Stages: validate -> search (one concurrent call per query) ->
    /// deduplicate by url -> summarize (one concurrent call per unique
    /// source) -> merge summaries -> format. On success the returned state
    /// carries `source_str`, `unique_sources`, the updated usage ledger and
    /// a `web_search` trace entry.
    #[instrument(skip(self, state), fields(topic = %state.topic))]
    pub async fn run(&self, mut state: PipelineState) -> Result<PipelineState> {
        self.validate(&state)?;

        let query_texts: Vec<String> = state
            .search_queries
            .iter()
            .map(|query| query.search_query.clone())
            .collect();

        info!(queries = query_texts.len(), "starting web search");
        let batches = search_all(&self.search, &query_texts, &self.config.search_options()).await?;

        let unique_sources = dedupe(&batches)?;
        info!(unique_sources = unique_sources.len(), "deduplicated search results");

        let started = Instant::now();
        let batch = summarize_all(&self.llm, &state.topic, &unique_sources).await?;
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "summarization finished");

        state.token_usage.record(self.llm.model_name(), batch.usage);

        let summarized = merge_summaries(unique_sources, batch.summaries);
        state.source_str = Some(format_sources(
            &summarized,
            self.config.max_tokens_per_source,
            false,
        ));
        state.unique_sources = Some(summarized);
        state.steps.push(PipelineStep::WebSearch);

        Ok(state)
    }

    /// Field-presence checks against the typed state, before any external
    /// call.
    fn validate(&self, state: &PipelineState) -> Result<()> {
        if state.topic.trim().is_empty() {
            return Err(CoreError::Precondition("state has no topic".into()).into());
        }
        if state.search_queries.is_empty() {
            return Err(CoreError::Precondition(
                "state must contain at least one search query".into(),
            )
            .into());
        }
        for (i, query) in state.search_queries.iter().enumerate() {
            if query.search_query.trim().is_empty() {
                return Err(CoreError::Precondition(format!(
                    "query at index {i} has no search text"
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// Zip the deduplicated map with its summaries, in map order. Each merged
/// record keeps its url key and title, carries the summary as content, and
/// drops the raw content.
fn merge_summaries(sources: UniqueSourceMap, summaries: Vec<String>) -> UniqueSourceMap {
    sources
        .into_iter()
        .zip(summaries)
        .map(|((url, source), summary)| {
            let merged = SourceRecord::new(url.clone(), source.title, summary);
            (url, merged)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::SourceRecord;

    #[test]
    fn merge_keeps_order_titles_and_drops_raw_content() {
        let sources: UniqueSourceMap = vec![
            SourceRecord::new("https://a.com", "A", "ca").with_raw_content("raw-a"),
            SourceRecord::new("https://b.com", "B", "cb"),
        ]
        .into_iter()
        .map(|record| (record.url.clone(), record))
        .collect();

        let merged = merge_summaries(sources, vec!["summary-a".into(), "summary-b".into()]);

        let urls: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(urls, vec!["https://a.com", "https://b.com"]);
        assert_eq!(merged["https://a.com"].title, "A");
        assert_eq!(merged["https://a.com"].content, "summary-a");
        assert!(merged["https://a.com"].raw_content.is_none());
        assert_eq!(merged["https://b.com"].content, "summary-b");
    }

    #[test]
    fn config_rejects_zero_budgets() {
        let config = PipelineConfig {
            max_tokens_per_source: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            max_results_per_query: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }
}
