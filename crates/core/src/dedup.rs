//! Source deduplication by identity url.
//!
//! Collapses one or more search batches into a single insertion-ordered
//! url -> record map. The first occurrence of a url wins; later duplicates
//! are discarded without merging fields. That is a defined policy: the first
//! result a query surfaced is the one whose title/content we keep.

use crate::error::{CoreError, Result};
use crate::source::{SearchBatch, UniqueSourceMap};

/// Deduplicate search batches by url, preserving first-seen order.
///
/// Batches are flattened in batch order, then within-batch order. A record
/// with an empty url violates the source-record contract and fails the whole
/// call rather than being dropped.
pub fn dedupe(batches: &[SearchBatch]) -> Result<UniqueSourceMap> {
    let mut unique_sources = UniqueSourceMap::new();

    for batch in batches {
        for record in batch.records() {
            if record.url.is_empty() {
                return Err(CoreError::DataContract(format!(
                    "source record '{}' has no url",
                    record.title
                )));
            }
            if !unique_sources.contains_key(&record.url) {
                unique_sources.insert(record.url.clone(), record.clone());
            }
        }
    }

    Ok(unique_sources)
}
