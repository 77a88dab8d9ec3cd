//! Core domain types for scout
//!
//! This crate defines the pure building blocks shared by the research
//! agents: search queries, source records, deduplication, source
//! formatting, token-usage accounting and the pipeline state. No IO
//! happens here.

pub mod dedup;
pub mod error;
pub mod format;
pub mod price;
pub mod query;
pub mod source;
pub mod state;
pub mod usage;

pub use dedup::dedupe;
pub use error::{CoreError, Result};
pub use format::format_sources;
pub use price::{calculate_token_cost, price_per_million_tokens, PriceRate};
pub use query::{Queries, SearchQuery};
pub use source::{SearchBatch, SourceRecord, UniqueSourceMap};
pub use state::{PipelineState, PipelineStep};
pub use usage::{TokenUsage, UsageLedger};
