//! Token usage accounting - per-model running totals

use std::ops::{Add, AddAssign};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Input/output token counts for one model or one call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            input_tokens: self.input_tokens + rhs.input_tokens,
            output_tokens: self.output_tokens + rhs.output_tokens,
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: TokenUsage) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
    }
}

/// Running token totals keyed by model name.
///
/// Mutated additively throughout a pipeline run and never reset mid-run;
/// the caller reads it after completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageLedger(IndexMap<String, TokenUsage>);

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `usage` to the running total for `model`.
    pub fn record(&mut self, model: &str, usage: TokenUsage) {
        *self.0.entry(model.to_string()).or_default() += usage;
    }

    /// The running total for `model`, zero if the model was never recorded.
    pub fn usage_for(&self, model: &str) -> TokenUsage {
        self.0.get(model).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenUsage)> {
        self.0.iter().map(|(model, usage)| (model.as_str(), usage))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assign_is_additive() {
        let mut usage = TokenUsage::new(10, 5);
        usage += TokenUsage::new(3, 7);
        assert_eq!(usage, TokenUsage::new(13, 12));
    }

    #[test]
    fn ledger_accumulates_per_model() {
        let mut ledger = UsageLedger::new();
        ledger.record("llama-3.3-70b-versatile", TokenUsage::new(100, 20));
        ledger.record("llama-3.3-70b-versatile", TokenUsage::new(50, 10));
        ledger.record("gpt-4o-mini", TokenUsage::new(1, 1));

        assert_eq!(
            ledger.usage_for("llama-3.3-70b-versatile"),
            TokenUsage::new(150, 30)
        );
        assert_eq!(ledger.usage_for("gpt-4o-mini"), TokenUsage::new(1, 1));
    }

    #[test]
    fn unrecorded_model_reads_as_zero() {
        let ledger = UsageLedger::new();
        assert!(ledger.usage_for("unknown").is_zero());
    }

    #[test]
    fn pre_populated_total_is_preserved() {
        let mut ledger = UsageLedger::new();
        ledger.record("m", TokenUsage::new(7, 3));

        // A later batch adds to, never replaces, the prior total.
        ledger.record("m", TokenUsage::new(13, 17));
        assert_eq!(ledger.usage_for("m"), TokenUsage::new(20, 20));
    }
}
