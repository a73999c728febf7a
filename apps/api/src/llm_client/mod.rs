/// LLM client — the single point of entry for all Claude API calls in Resuma.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All model interactions go through a [`ChatSession`], which carries the
/// conversation history for one analysis request.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in Resuma.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("inference service unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("inference API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("inference service rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("inference service returned an unreadable response: {0}")]
    Malformed(String),

    #[error("inference service returned no text content")]
    EmptyContent,
}

/// One turn of a conversation. Owned so a session can accumulate history.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Transport seam for the chat model. The production implementation is
/// [`LlmClient`]; tests substitute scripted doubles for fault injection.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, system: &str, messages: &[ChatMessage])
        -> Result<String, LlmError>;
}

/// The single LLM client used by the analysis pipeline.
/// Wraps the Anthropic Messages API with bounded retry on transient failures.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes a raw call to the Claude API with the full message history.
    /// Retries on 429 (rate limit), 5xx, and transport errors with
    /// exponential backoff.
    async fn call(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Unavailable(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse error message
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = match response.json().await {
                Ok(r) => r,
                Err(e) if e.is_decode() => return Err(LlmError::Malformed(e.to_string())),
                Err(e) => return Err(LlmError::Unavailable(e)),
            };

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        // Retries exhausted. A final 429 surfaces as a rate-limit error;
        // anything else surfaces as the last failure seen.
        match last_error {
            Some(LlmError::Api { status: 429, .. }) | None => Err(LlmError::RateLimited {
                retries: MAX_RETRIES,
            }),
            Some(e) => Err(e),
        }
    }
}

#[async_trait]
impl ChatTransport for LlmClient {
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<String, LlmError> {
        let response = self.call(system, messages).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(text.to_string())
    }
}

/// A stateful conversational context with the model, scoped to one analysis
/// request. Earlier turns are resent with every call, so later prompts see
/// them as context. Sessions are never shared or reused across requests.
pub struct ChatSession<'a> {
    transport: &'a dyn ChatTransport,
    system: String,
    messages: Vec<ChatMessage>,
}

impl<'a> ChatSession<'a> {
    pub fn new(transport: &'a dyn ChatTransport, system: impl Into<String>) -> Self {
        Self {
            transport,
            system: system.into(),
            messages: Vec::new(),
        }
    }

    /// Sends one prompt and returns the assistant's reply, recording both
    /// as history for subsequent sends.
    pub async fn send(&mut self, prompt: &str) -> Result<String, LlmError> {
        self.messages.push(ChatMessage::user(prompt));

        let reply = match self.transport.complete(&self.system, &self.messages).await {
            Ok(reply) => reply,
            Err(e) => {
                // The history must never hold a user turn without its reply.
                self.messages.pop();
                return Err(e);
            }
        };

        self.messages.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    #[allow(dead_code)]
    pub fn history(&self) -> &[ChatMessage] {
        &self.messages
    }
}
