//! Agent error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Core(#[from] scout_core::CoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The search or LLM provider call failed (auth, rate limit, malformed
    /// response). Never retried here; the orchestrator surfaces it as-is.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
