//! LLM completion clients for the supported providers.
//!
//! One `ChatClient` speaks to whichever provider is configured: Groq and
//! OpenAI through the OpenAI-compatible `/chat/completions` endpoint,
//! Ollama through `/api/chat`, Anthropic through `/v1/messages`. Every
//! completion reports its token usage so the pipeline can keep the ledger
//! exact.

use std::future::Future;
use std::str::FromStr;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AgentError, Result};
use scout_core::TokenUsage;

const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One model response plus the tokens it consumed.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// A language-model backend that can complete a prompt.
///
/// Implementations must be `Send + Sync`; the summarization stage issues
/// one concurrent `complete` call per unique source.
pub trait CompletionClient: Send + Sync {
    /// Complete `prompt` and report token usage.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<Completion>> + Send;

    /// The model name usage is recorded under.
    fn model_name(&self) -> &str;
}

/// Supported LLM providers, in alphabetical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Anthropic,
    Groq,
    Ollama,
    OpenAi,
}

impl LlmProvider {
    fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => DEFAULT_ANTHROPIC_URL,
            LlmProvider::Groq => DEFAULT_GROQ_URL,
            LlmProvider::Ollama => DEFAULT_OLLAMA_URL,
            LlmProvider::OpenAi => DEFAULT_OPENAI_URL,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(LlmProvider::Anthropic),
            "groq" => Ok(LlmProvider::Groq),
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(AgentError::Processing(format!(
                "unsupported LLM provider: {other}"
            ))),
        }
    }
}

/// Sampling parameters applied to every completion.
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_completion_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.95,
            max_completion_tokens: 32_768,
        }
    }
}

/// Chat completion client over a single configured provider.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    provider: LlmProvider,
    base_url: String,
    api_key: String,
    model: String,
    params: SamplingParams,
}

impl ChatClient {
    pub fn new(
        provider: LlmProvider,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            provider,
            base_url: provider.default_base_url().to_string(),
            api_key: api_key.into(),
            model: model.into(),
            params: SamplingParams::default(),
        }
    }

    /// Builder: override the provider base url (self-hosted endpoints)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder: override sampling parameters
    pub fn with_params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    async fn openai_complete(&self, prompt: &str) -> Result<Completion> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = OpenAiChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            max_completion_tokens: self.params.max_completion_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<OpenAiChatResponse>()
            .await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("completion response has no choices".into()))?;

        Ok(Completion {
            content: choice.message.content,
            usage: TokenUsage::new(response.usage.prompt_tokens, response.usage.completion_tokens),
        })
    }

    async fn ollama_complete(&self, prompt: &str) -> Result<Completion> {
        let url = format!("{}/api/chat", self.base_url);
        let request = OllamaChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: OllamaOptions {
                temperature: self.params.temperature,
                top_p: self.params.top_p,
                num_predict: self.params.max_completion_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<OllamaChatResponse>()
            .await?;

        Ok(Completion {
            content: response.message.content,
            usage: TokenUsage::new(
                response.prompt_eval_count.unwrap_or(0),
                response.eval_count.unwrap_or(0),
            ),
        })
    }

    async fn anthropic_complete(&self, prompt: &str) -> Result<Completion> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.params.max_completion_tokens,
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<AnthropicResponse>()
            .await?;

        let content = response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(Completion {
            content,
            usage: TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens),
        })
    }
}

impl CompletionClient for ChatClient {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        debug!(provider = ?self.provider, model = %self.model, prompt_chars = prompt.len(), "requesting completion");
        match self.provider {
            LlmProvider::Groq | LlmProvider::OpenAi => self.openai_complete(prompt).await,
            LlmProvider::Ollama => self.ollama_complete(prompt).await,
            LlmProvider::Anthropic => self.anthropic_complete(prompt).await,
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Remove `<think>...</think>` spans that reasoning models prepend to their
/// answer. Unclosed spans are cut to the end of the text.
pub fn strip_thinking_tokens(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

// ==========================================
// REQUEST/RESPONSE TYPES
// ==========================================

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_completion_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: OpenAiUsage,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}
