//! Error types for the core domain

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required input was missing or empty. Raised before any external call.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Upstream data violated the source-record contract (e.g. a record
    /// without an identity url). Never skipped, so provider drift surfaces
    /// immediately instead of being masked.
    #[error("Data contract violation: {0}")]
    DataContract(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
