//! Web search gateway - concurrent multi-query search against Tavily.
//!
//! One independent search call is issued per query; all calls start
//! together and are awaited jointly. The returned batches preserve input
//! query order index-for-index regardless of completion order. Any single
//! failed call fails the whole gateway call; nothing is retried here.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use chrono::{Duration, Utc};
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{AgentError, Result};
use scout_core::SearchBatch;

const DEFAULT_TAVILY_URL: &str = "https://api.tavily.com";

/// Search category, mapped to the provider's `topic` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    #[default]
    General,
    News,
    Finance,
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchCategory::General => "general",
            SearchCategory::News => "news",
            SearchCategory::Finance => "finance",
        };
        f.write_str(name)
    }
}

impl FromStr for SearchCategory {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(SearchCategory::General),
            "news" => Ok(SearchCategory::News),
            "finance" => Ok(SearchCategory::Finance),
            other => Err(AgentError::Processing(format!(
                "unsupported search category: {other}"
            ))),
        }
    }
}

/// Search depth, mapped to the provider's `search_depth` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

impl FromStr for SearchDepth {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(SearchDepth::Basic),
            "advanced" => Ok(SearchDepth::Advanced),
            other => Err(AgentError::Processing(format!(
                "unsupported search depth: {other}"
            ))),
        }
    }
}

/// Options applied to every search call in one gateway invocation.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub category: SearchCategory,
    pub depth: SearchDepth,
    /// Recency window for news searches, in days back from today
    pub days_back: u32,
    /// Result cap per query
    pub max_results: usize,
    pub include_raw_content: bool,
    pub chunks_per_source: u32,
    pub include_images: bool,
    pub include_image_descriptions: bool,
    pub include_favicon: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            category: SearchCategory::General,
            depth: SearchDepth::Basic,
            days_back: 7,
            max_results: 5,
            include_raw_content: true,
            chunks_per_source: 3,
            include_images: false,
            include_image_descriptions: false,
            include_favicon: false,
        }
    }
}

/// A web search backend.
///
/// Implementations must be `Send + Sync`; the gateway issues one concurrent
/// `search` call per query.
pub trait SearchProvider: Send + Sync {
    /// Execute one search call and return its raw batch.
    fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> impl Future<Output = Result<SearchBatch>> + Send;
}

/// Client for the Tavily search API
#[derive(Clone)]
pub struct TavilyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_TAVILY_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Builder: override the API base url
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchBatch> {
        let url = format!("{}/search", self.base_url);

        // News searches are bounded to the recency window; general and
        // finance searches are unrestricted in time.
        let (days, start_date) = match options.category {
            SearchCategory::News => (
                Some(options.days_back),
                Some(news_start_date(options.days_back)),
            ),
            SearchCategory::General | SearchCategory::Finance => (None, None),
        };

        let request = TavilySearchRequest {
            query,
            topic: options.category,
            search_depth: options.depth,
            max_results: options.max_results,
            include_raw_content: options.include_raw_content,
            chunks_per_source: options.chunks_per_source,
            include_images: options.include_images,
            include_image_descriptions: options.include_image_descriptions,
            include_favicon: options.include_favicon,
            days,
            start_date,
        };

        let batch = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<SearchBatch>()
            .await?;

        debug!(query, results = batch.len(), "search call returned");
        Ok(batch)
    }
}

/// ISO start date `days_back` days before today (UTC).
fn news_start_date(days_back: u32) -> String {
    (Utc::now() - Duration::days(i64::from(days_back)))
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

/// Fan out one concurrent search call per query and await them all.
///
/// The output preserves input order: `batches[i]` is the result for
/// `queries[i]` even though completion order is unspecified. If any call
/// fails, the whole gateway call fails with that error.
#[instrument(skip(provider, queries, options), fields(query_count = queries.len()))]
pub async fn search_all<P: SearchProvider>(
    provider: &P,
    queries: &[String],
    options: &SearchOptions,
) -> Result<Vec<SearchBatch>> {
    let searches = queries.iter().map(|query| provider.search(query, options));
    let outcomes = join_all(searches).await;

    let batches = outcomes.into_iter().collect::<Result<Vec<_>>>()?;
    debug!(
        batches = batches.len(),
        records = batches.iter().map(SearchBatch::len).sum::<usize>(),
        "all search calls completed"
    );
    Ok(batches)
}

// ==========================================
// REQUEST TYPES
// ==========================================

#[derive(Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    topic: SearchCategory,
    search_depth: SearchDepth,
    max_results: usize,
    include_raw_content: bool,
    chunks_per_source: u32,
    include_images: bool,
    include_image_descriptions: bool,
    include_favicon: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::SourceRecord;

    struct StaticProvider;

    impl SearchProvider for StaticProvider {
        async fn search(&self, query: &str, _options: &SearchOptions) -> Result<SearchBatch> {
            Ok(SearchBatch::Bare(vec![SourceRecord::new(
                format!("https://example.com/{query}"),
                query,
                "content",
            )]))
        }
    }

    struct FailingProvider;

    impl SearchProvider for FailingProvider {
        async fn search(&self, query: &str, _options: &SearchOptions) -> Result<SearchBatch> {
            Err(AgentError::Provider(format!("search failed for {query}")))
        }
    }

    #[test]
    fn category_display_and_parse_roundtrip() {
        for category in [
            SearchCategory::General,
            SearchCategory::News,
            SearchCategory::Finance,
        ] {
            let parsed: SearchCategory = category.to_string().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn depth_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SearchDepth::Advanced).unwrap(),
            "\"advanced\""
        );
    }

    #[test]
    fn news_start_date_is_iso_date() {
        let date = news_start_date(7);
        assert_eq!(date.len(), 10);
        assert_eq!(date.matches('-').count(), 2);
    }

    #[test]
    fn news_request_carries_recency_fields() {
        // Only the news category derives a start_date cutoff.
        let options = SearchOptions {
            category: SearchCategory::News,
            days_back: 30,
            ..SearchOptions::default()
        };
        let (days, start_date) = match options.category {
            SearchCategory::News => (
                Some(options.days_back),
                Some(news_start_date(options.days_back)),
            ),
            _ => (None, None),
        };
        assert_eq!(days, Some(30));
        assert!(start_date.is_some());
    }

    #[tokio::test]
    async fn search_all_preserves_input_order() {
        let queries: Vec<String> = vec!["alpha".into(), "beta".into(), "gamma".into()];
        let batches = search_all(&StaticProvider, &queries, &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(batches.len(), 3);
        for (batch, query) in batches.iter().zip(&queries) {
            assert_eq!(batch.records()[0].title, *query);
        }
    }

    #[tokio::test]
    async fn any_failed_call_fails_the_gateway() {
        let queries: Vec<String> = vec!["alpha".into(), "beta".into()];
        let result = search_all(&FailingProvider, &queries, &SearchOptions::default()).await;
        assert!(matches!(result, Err(AgentError::Provider(_))));
    }

    #[tokio::test]
    async fn empty_query_list_returns_no_batches() {
        let batches = search_all(&StaticProvider, &[], &SearchOptions::default())
            .await
            .unwrap();
        assert!(batches.is_empty());
    }
}
