//! Per-source summarization fan-out.
//!
//! One concurrent completion call per unique source, awaited jointly.
//! Fan-out width equals the number of sources with no cap and no
//! backpressure; a hung provider call stalls the whole step. Any single
//! failure fails the batch and no partial usage or summaries escape.

use futures::future::join_all;
use tracing::{debug, instrument};

use crate::llm::CompletionClient;
use crate::Result;
use scout_core::{CoreError, SourceRecord, TokenUsage, UniqueSourceMap};

/// Per-source context cap, in characters (~100K).
const MAX_CONTEXT_CHARS: usize = 102_400;

const SUMMARIZER_INSTRUCTIONS: &str = "\
You are a world class researcher who is working on a report about a specific topic.

<goal>
Generate a very high quality informative summary of the given context in accordance with the topic.
</goal>

The topic you are working on:
<topic>
{topic}
</topic>

The context to use in generating the informative summary:
<context>
{context}
</context>

Prepare your summary according to the topic.
Include all necessary information related with the topic in your summary.
";

/// The outcome of one fan-out: summaries aligned to the source map's
/// insertion order, plus the summed token usage of every call.
#[derive(Debug, Clone)]
pub struct SummaryBatch {
    /// `summaries[i]` belongs to the i-th entry of the input map
    pub summaries: Vec<String>,
    pub usage: TokenUsage,
}

/// Summarize every source concurrently and aggregate token usage.
///
/// The prompt context per source prefers `raw_content` capped at 100K
/// characters; a missing or empty `raw_content` falls back to `content`
/// verbatim. Preconditions (non-empty topic, non-empty sources) are
/// checked before any call is issued.
#[instrument(skip(client, topic, sources), fields(source_count = sources.len()))]
pub async fn summarize_all<C: CompletionClient>(
    client: &C,
    topic: &str,
    sources: &UniqueSourceMap,
) -> Result<SummaryBatch> {
    if topic.trim().is_empty() {
        return Err(CoreError::Precondition("topic must not be empty".into()).into());
    }
    if sources.is_empty() {
        return Err(CoreError::Precondition("no sources to summarize".into()).into());
    }

    let prompts: Vec<String> = sources
        .values()
        .map(|source| summarizer_prompt(topic, source))
        .collect();

    let calls = prompts.iter().map(|prompt| client.complete(prompt));
    let completions = join_all(calls)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    let mut usage = TokenUsage::default();
    let mut summaries = Vec::with_capacity(completions.len());
    for completion in completions {
        usage += completion.usage;
        summaries.push(completion.content);
    }

    debug!(
        summaries = summaries.len(),
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        "summarization fan-out completed"
    );

    Ok(SummaryBatch { summaries, usage })
}

/// Build the bounded summarizer prompt for one source.
fn summarizer_prompt(topic: &str, source: &SourceRecord) -> String {
    let context = match source.raw_content.as_deref() {
        Some(raw) if !raw.trim().is_empty() => truncate_chars(raw, MAX_CONTEXT_CHARS),
        _ => source.content.clone(),
    };

    SUMMARIZER_INSTRUCTIONS
        .replace("{topic}", topic)
        .replace("{context}", &context)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        text.chars().take(limit).collect()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Completion;
    use crate::AgentError;
    use scout_core::SourceRecord;

    struct EchoClient;

    impl CompletionClient for EchoClient {
        async fn complete(&self, prompt: &str) -> Result<Completion> {
            Ok(Completion {
                content: format!("summary({})", prompt.len()),
                usage: TokenUsage::new(10, 2),
            })
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct FailOnUrl(&'static str);

    impl CompletionClient for FailOnUrl {
        async fn complete(&self, prompt: &str) -> Result<Completion> {
            if prompt.contains(self.0) {
                return Err(AgentError::Provider("summarization failed".into()));
            }
            Ok(Completion {
                content: "ok".into(),
                usage: TokenUsage::new(1, 1),
            })
        }

        fn model_name(&self) -> &str {
            "flaky"
        }
    }

    fn sources(records: Vec<SourceRecord>) -> UniqueSourceMap {
        records
            .into_iter()
            .map(|record| (record.url.clone(), record))
            .collect()
    }

    #[tokio::test]
    async fn empty_topic_is_a_precondition_error() {
        let map = sources(vec![SourceRecord::new("https://a.com", "A", "c")]);
        let err = summarize_all(&EchoClient, "  ", &map).await.unwrap_err();
        assert!(matches!(err, AgentError::Core(CoreError::Precondition(_))));
    }

    #[tokio::test]
    async fn empty_sources_is_a_precondition_error() {
        let err = summarize_all(&EchoClient, "topic", &UniqueSourceMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Core(CoreError::Precondition(_))));
    }

    #[tokio::test]
    async fn usage_sums_across_all_calls() {
        let map = sources(vec![
            SourceRecord::new("https://a.com", "A", "ca"),
            SourceRecord::new("https://b.com", "B", "cb"),
            SourceRecord::new("https://c.com", "C", "cc"),
        ]);

        let batch = summarize_all(&EchoClient, "topic", &map).await.unwrap();
        assert_eq!(batch.summaries.len(), 3);
        assert_eq!(batch.usage, TokenUsage::new(30, 6));
    }

    #[tokio::test]
    async fn single_failure_fails_the_whole_batch() {
        let map = sources(vec![
            SourceRecord::new("https://a.com", "A", "fine"),
            SourceRecord::new("https://b.com", "B", "poison-pill"),
            SourceRecord::new("https://c.com", "C", "fine"),
        ]);

        let result = summarize_all(&FailOnUrl("poison-pill"), "topic", &map).await;
        assert!(matches!(result, Err(AgentError::Provider(_))));
    }

    #[test]
    fn prompt_prefers_raw_content() {
        let source =
            SourceRecord::new("https://a.com", "A", "short").with_raw_content("the long version");
        let prompt = summarizer_prompt("t", &source);
        assert!(prompt.contains("the long version"));
        assert!(!prompt.contains("short"));
    }

    #[test]
    fn empty_raw_content_falls_back_to_content() {
        let source = SourceRecord::new("https://a.com", "A", "short").with_raw_content("  ");
        let prompt = summarizer_prompt("t", &source);
        assert!(prompt.contains("short"));
    }

    #[test]
    fn raw_content_is_capped_at_context_limit() {
        let long = "x".repeat(MAX_CONTEXT_CHARS + 500);
        let source = SourceRecord::new("https://a.com", "A", "short").with_raw_content(long);
        let prompt = summarizer_prompt("t", &source);
        let context_len = prompt.matches('x').count();
        assert_eq!(context_len, MAX_CONTEXT_CHARS);
    }
}
