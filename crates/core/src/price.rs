//! Model pricing - USD per million tokens, and cost estimation for a ledger

use tracing::warn;

use crate::usage::UsageLedger;

/// Published USD rates per million tokens for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRate {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

const fn rate(input_per_million: f64, output_per_million: f64) -> PriceRate {
    PriceRate {
        input_per_million,
        output_per_million,
    }
}

/// Look up the published rate for a model name, across providers.
///
/// Returns `None` for models without a published rate (e.g. self-served
/// Ollama/vLLM models, which cost nothing per token).
pub fn price_per_million_tokens(model: &str) -> Option<PriceRate> {
    let rate = match model {
        // Groq
        "deepseek-r1-distill-llama-70b" => rate(0.75, 0.99),
        "gemma2-9b-it" => rate(0.20, 0.20),
        "llama3-70b-8192" => rate(0.59, 0.79),
        "llama3-8b-8192" => rate(0.05, 0.08),
        "llama-3.1-8b-instant" => rate(0.05, 0.08),
        "llama-3.3-70b-versatile" => rate(0.59, 0.79),
        "meta-llama/llama-4-maverick-17b-128e-instruct" => rate(0.20, 0.60),
        "meta-llama/llama-4-scout-17b-16e-instruct" => rate(0.11, 0.34),
        "meta-llama/llama-guard-4-12b" => rate(0.20, 0.20),
        "mistral-saba-24b" => rate(0.79, 0.79),
        "qwen-qwq-32b" => rate(0.29, 0.39),
        // OpenAI
        "gpt-4.1" => rate(2.00, 8.00),
        "gpt-4.1-mini" => rate(0.40, 1.60),
        "gpt-4.1-nano" => rate(0.10, 0.40),
        "gpt-4o" => rate(2.50, 10.00),
        "gpt-4o-mini" => rate(0.15, 0.60),
        "o1" => rate(15.00, 60.00),
        "o3" => rate(10.00, 40.00),
        "o1-mini" => rate(1.10, 4.40),
        "o3-mini" => rate(1.10, 4.40),
        // Anthropic
        "claude-opus-4-latest" => rate(15.00, 75.00),
        "claude-sonnet-4-latest" => rate(3.00, 15.00),
        "claude-3-5-haiku-latest" => rate(0.80, 4.00),
        "claude-3-7-sonnet-latest" => rate(3.00, 15.00),
        _ => return None,
    };
    Some(rate)
}

/// Estimated USD cost for everything recorded in the ledger.
///
/// Models without a published rate contribute zero and log a warning.
pub fn calculate_token_cost(ledger: &UsageLedger) -> f64 {
    let mut total = 0.0;
    for (model, usage) in ledger.iter() {
        match price_per_million_tokens(model) {
            Some(rate) => {
                total += usage.input_tokens as f64 / 1_000_000.0 * rate.input_per_million;
                total += usage.output_tokens as f64 / 1_000_000.0 * rate.output_per_million;
            }
            None => warn!(model, "no published price for model, counting as free"),
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::TokenUsage;

    #[test]
    fn known_model_has_rate() {
        let rate = price_per_million_tokens("gpt-4o-mini").unwrap();
        assert!((rate.input_per_million - 0.15).abs() < f64::EPSILON);
        assert!((rate.output_per_million - 0.60).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_model_has_no_rate() {
        assert!(price_per_million_tokens("phi4-mini:latest").is_none());
    }

    #[test]
    fn ledger_cost_sums_input_and_output() {
        let mut ledger = UsageLedger::new();
        ledger.record("gpt-4o", TokenUsage::new(1_000_000, 1_000_000));

        let cost = calculate_token_cost(&ledger);
        assert!((cost - 12.50).abs() < 1e-9);
    }

    #[test]
    fn unknown_models_cost_nothing() {
        let mut ledger = UsageLedger::new();
        ledger.record("my-local-model", TokenUsage::new(5_000_000, 5_000_000));

        assert_eq!(calculate_token_cost(&ledger), 0.0);
    }
}
