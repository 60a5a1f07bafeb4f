//! LLM collaborator: an OpenAI-compatible chat-completions client.
//!
//! The same client serves the knowledge chain and the code/recipe handlers,
//! each with its own system prompt. A call makes at most two HTTP attempts:
//! the second only after a short backoff, and only for connection errors, 429
//! and 5xx responses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::{Answer, KnowledgeSource, SourceError, SourceKind};
use crate::config::LlmConfig;
use crate::query::Query;

pub const KNOWLEDGE_SYSTEM_PROMPT: &str = "You are MC AI, a friendly assistant. Answer factual \
    questions accurately and concisely in plain language. If you are not sure, say so.";

pub const CODE_SYSTEM_PROMPT: &str = "You are MC AI, a helpful programming assistant. Answer with \
    working code in a fenced block followed by a short explanation.";

pub const RECIPE_SYSTEM_PROMPT: &str = "You are MC AI, a cooking assistant. Reply with a short \
    ingredient list and numbered steps.";

/// What is sent to the model.
#[derive(Debug, Clone)]
pub struct LlmPrompt<'a> {
    pub system: &'a str,
    /// Prior conversation turns, newline-joined. May be empty.
    pub context: String,
    pub question: &'a str,
}

impl<'a> LlmPrompt<'a> {
    pub fn for_query(system: &'a str, query: &'a Query) -> Self {
        Self {
            system,
            context: query.context(),
            question: &query.text,
        }
    }
}

/// Anything that turns a prompt into text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &LlmPrompt<'_>) -> Result<String, SourceError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for `{endpoint}/chat/completions`.
pub struct HttpLlmClient {
    config: LlmConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {e}"))?;
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled && self.api_key.is_some()
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<String, SourceError> {
        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            SourceError::from_reqwest(e, Duration::from_secs(self.config.request_timeout_secs))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

fn is_retryable(error: &SourceError) -> bool {
    match error {
        SourceError::Http(_) => true,
        SourceError::Status(code) => *code == 429 || *code >= 500,
        _ => false,
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &LlmPrompt<'_>) -> Result<String, SourceError> {
        if !self.is_enabled() {
            return Err(SourceError::Disabled);
        }

        let context_block = (!prompt.context.is_empty())
            .then(|| format!("Earlier in this conversation:\n{}", prompt.context));

        let mut messages = vec![ChatMessage {
            role: "system",
            content: prompt.system,
        }];
        if let Some(context) = &context_block {
            messages.push(ChatMessage {
                role: "system",
                content: context,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.question,
        });

        let body = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
        };

        match self.send_once(&body).await {
            Err(e) if is_retryable(&e) => {
                tracing::debug!(error = %e, backoff_ms = self.config.retry_backoff_ms, "retrying LLM call");
                tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                self.send_once(&body).await
            }
            other => other,
        }
    }
}

/// LLM as the second source in the chain.
pub struct LlmSource {
    client: Arc<dyn LlmClient>,
}

impl LlmSource {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KnowledgeSource for LlmSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Llm
    }

    async fn attempt(&self, query: &Query) -> Result<Option<Answer>, SourceError> {
        let prompt = LlmPrompt::for_query(KNOWLEDGE_SYSTEM_PROMPT, query);
        let text = self.client.complete(&prompt).await?;
        Ok((!text.is_empty()).then(|| Answer::new(text, SourceKind::Llm)))
    }
}
