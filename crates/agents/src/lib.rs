//! Research agents for scout
//!
//! This crate contains the async collaborators and the orchestrator:
//! - QueryWriter: turns a topic into targeted search queries
//! - Search gateway: concurrent multi-query web search (Tavily)
//! - Summarization fan-out: one concurrent LLM call per unique source
//! - WebSearchPipeline: composes the stages over a PipelineState

pub mod error;
pub mod llm;
pub mod pipeline;
pub mod query_writer;
pub mod search;
pub mod summarize;

pub use error::{AgentError, Result};
pub use llm::{strip_thinking_tokens, ChatClient, Completion, CompletionClient, LlmProvider, SamplingParams};
pub use pipeline::{PipelineConfig, WebSearchPipeline};
pub use query_writer::{GeneratedQueries, QueryWriter};
pub use search::{search_all, SearchCategory, SearchDepth, SearchOptions, SearchProvider, TavilyClient};
pub use summarize::{summarize_all, SummaryBatch};
