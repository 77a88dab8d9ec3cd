//! Query writer - turns a topic into targeted web search queries via the LLM

use chrono::Utc;
use tracing::{debug, instrument};

use crate::llm::{strip_thinking_tokens, CompletionClient};
use crate::{AgentError, Result};
use scout_core::{CoreError, Queries, SearchQuery, TokenUsage};

const QUERY_WRITER_INSTRUCTIONS: &str = "\
<Goal>
Your goal is to generate targeted web search queries that will gather comprehensive information for writing a summary about a topic.
You will generate exactly {number_of_queries} queries.
</Goal>

<topic>
{topic}
</topic>

Today's date is:
<today>
{today}
</today>

<Requirements>
When generating the search queries:
1. Make sure to cover different aspects of the topic.
2. Make sure that your queries account for the most current information available as of today.

Your queries should be:
- Specific enough to avoid generic or irrelevant results.
- Targeted to gather specific information about the topic.
- Diverse enough to cover all aspects of the summary plan.
</Requirements>

<Format>
* Format your response as a JSON object with one field:
    - queries: Queries you generate according to the given topic.
* Each query should have the following three fields:
    - search_query: Text of the query.
    - aspect: Which aspect of the topic the query aims to cover.
    - rationale: Your reasoning.

Return the queries in JSON format:
{
    \"queries\": [
            {
                \"search_query\": \"string\",
                \"aspect\": \"string\",
                \"rationale\": \"string\"
            }
    ]
}
</Format>

<Task>
It is very important that you generate exactly {number_of_queries} queries.
Generate targeted web search queries that will gather specific information about the given topic.
</Task>
";

/// Queries generated for a topic, plus the tokens the call consumed.
#[derive(Debug, Clone)]
pub struct GeneratedQueries {
    pub search_queries: Vec<SearchQuery>,
    pub usage: TokenUsage,
}

/// Generates structured search queries with the configured LLM.
pub struct QueryWriter<C> {
    llm: C,
}

impl<C: CompletionClient> QueryWriter<C> {
    pub fn new(llm: C) -> Self {
        Self { llm }
    }

    /// The model name the generation usage should be recorded under.
    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    #[instrument(skip(self, topic))]
    pub async fn generate_queries(
        &self,
        topic: &str,
        number_of_queries: usize,
    ) -> Result<GeneratedQueries> {
        if topic.trim().is_empty() {
            return Err(CoreError::Precondition("topic must not be empty".into()).into());
        }

        let instructions = QUERY_WRITER_INSTRUCTIONS
            .replace("{topic}", topic)
            .replace("{today}", &Utc::now().date_naive().to_string())
            .replace("{number_of_queries}", &number_of_queries.to_string());

        let completion = self.llm.complete(&instructions).await?;
        let payload = normalize_json_payload(&strip_thinking_tokens(&completion.content));
        let parsed: Queries = serde_json::from_str(&payload).map_err(|e| {
            AgentError::Processing(format!(
                "query writer returned invalid JSON: {} ({e})",
                completion.content
            ))
        })?;

        debug!(queries = parsed.queries.len(), "generated search queries");

        Ok(GeneratedQueries {
            search_queries: parsed.queries,
            usage: completion.usage,
        })
    }
}

/// Strip markdown fences and surrounding prose so the payload parses as the
/// JSON object the model was asked for.
fn normalize_json_payload(payload: &str) -> String {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }

    let without_fence = if trimmed.starts_with("```") {
        let mut lines = trimmed.lines();
        let _ = lines.next(); // drop ``` or ```json
        let mut content = lines.collect::<Vec<_>>().join("\n");
        if content.ends_with("```") {
            content.truncate(content.len().saturating_sub(3));
        }
        content.trim().to_string()
    } else {
        trimmed.to_string()
    };

    if let (Some(start), Some(end)) = (without_fence.find('{'), without_fence.rfind('}')) {
        if start < end {
            return without_fence[start..=end].to_string();
        }
    }

    without_fence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Completion;

    struct CannedClient(&'static str);

    impl CompletionClient for CannedClient {
        async fn complete(&self, _prompt: &str) -> Result<Completion> {
            Ok(Completion {
                content: self.0.to_string(),
                usage: TokenUsage::new(120, 40),
            })
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    const VALID_PAYLOAD: &str = r#"{"queries": [
        {"search_query": "rust 2026 async ecosystem", "aspect": "ecosystem", "rationale": "overview"},
        {"search_query": "tokio latest release notes"}
    ]}"#;

    #[tokio::test]
    async fn parses_plain_json_response() {
        let writer = QueryWriter::new(CannedClient(VALID_PAYLOAD));
        let generated = writer.generate_queries("rust async", 2).await.unwrap();

        assert_eq!(generated.search_queries.len(), 2);
        assert_eq!(
            generated.search_queries[0].search_query,
            "rust 2026 async ecosystem"
        );
        assert_eq!(generated.usage, TokenUsage::new(120, 40));
    }

    #[tokio::test]
    async fn parses_fenced_json_with_thinking_prefix() {
        let writer = QueryWriter::new(CannedClient(
            "<think>figuring out queries</think>```json\n{\"queries\": [{\"search_query\": \"q\"}]}\n```",
        ));
        let generated = writer.generate_queries("topic", 1).await.unwrap();
        assert_eq!(generated.search_queries.len(), 1);
    }

    #[tokio::test]
    async fn invalid_json_is_a_processing_error() {
        let writer = QueryWriter::new(CannedClient("not json at all"));
        let err = writer.generate_queries("topic", 1).await.unwrap_err();
        assert!(matches!(err, AgentError::Processing(_)));
    }

    #[tokio::test]
    async fn empty_topic_is_rejected_before_any_call() {
        let writer = QueryWriter::new(CannedClient(VALID_PAYLOAD));
        let err = writer.generate_queries("", 3).await.unwrap_err();
        assert!(matches!(err, AgentError::Core(CoreError::Precondition(_))));
    }

    #[test]
    fn normalization_extracts_object_from_prose() {
        let payload = "Here you go:\n{\"queries\": []}\nHope that helps!";
        assert_eq!(normalize_json_payload(payload), "{\"queries\": []}");
    }
}
