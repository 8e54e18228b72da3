/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the OpenRouter API directly.
/// All LLM interactions MUST go through this module.
///
/// The transport lives behind the `ChatCompletions` trait so tests run
/// against a fake backend; the real backend speaks the OpenAI-compatible
/// chat-completions protocol via OpenRouter.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::config::Config;

pub mod response;

const MAX_ATTEMPTS: u32 = 2;
/// Fixed backoff between the two attempts.
const RETRY_BACKOFF: Duration = Duration::from_millis(800);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Model identifiers suggested when the configured one is rejected upstream.
const KNOWN_GOOD_MODELS: &[&str] = &[
    "openrouter/auto",
    "openai/gpt-4o-mini",
    "anthropic/claude-3.5-sonnet",
];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("{hint}")]
    ModelNotFound { hint: String },

    #[error("LLM call failed after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

impl LlmError {
    /// Builds the not-found error with a remediation hint naming models
    /// the gateway is known to accept.
    pub fn model_not_found(model: &str, message: &str) -> Self {
        LlmError::ModelNotFound {
            hint: format!(
                "Model or endpoint '{model}' not found ({message}). \
                Set OPENROUTER_MODEL to a known-good identifier such as: {}",
                KNOWN_GOOD_MODELS.join(", ")
            ),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, LlmError::ModelNotFound { .. })
    }
}

/// One turn of a chat conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Raw single-shot transport to a chat-completion endpoint.
/// Returns the provider's response as untyped JSON — the shape is not
/// trusted and is recovered by `response::extract_content`.
#[async_trait]
pub trait ChatCompletions: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Value, LlmError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

/// OpenAI-compatible backend pointed at OpenRouter.
pub struct OpenRouterBackend {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl OpenRouterBackend {
    pub fn new(api_key: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            api_base,
        }
    }
}

#[async_trait]
impl ChatCompletions for OpenRouterBackend {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Value, LlmError> {
        let request_body = CompletionRequest {
            model,
            messages,
            max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 404 || body.contains("not found") || body.contains("model_not_found")
            {
                return Err(LlmError::model_not_found(model, &body));
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// The single LLM client used by the whole pipeline, constructed once at
/// process start. No implicit global lookup.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn ChatCompletions>,
    model: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            backend: Arc::new(OpenRouterBackend::new(
                config.openrouter_api_key.clone(),
                config.openrouter_api_base.clone(),
            )),
            model: config.openrouter_model.clone(),
        }
    }

    /// Builds a client over an arbitrary backend. Used by tests to plug in
    /// a fake transport.
    pub fn with_backend(backend: Arc<dyn ChatCompletions>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Calls the chat endpoint and returns the extracted text content.
    ///
    /// At most 2 attempts with a fixed 800 ms backoff between them.
    /// A model/endpoint-not-found failure is a configuration error and is
    /// never retried; every other transport failure gets the one retry.
    pub async fn call_chat(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    RETRY_BACKOFF.as_millis()
                );
                tokio::time::sleep(RETRY_BACKOFF).await;
            }

            match self
                .backend
                .complete(&self.model, messages, max_tokens, temperature)
                .await
            {
                Ok(raw) => return Ok(response::extract_content(&raw)),
                Err(e @ LlmError::ModelNotFound { .. }) => return Err(e),
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(LlmError::Exhausted {
            attempts: MAX_ATTEMPTS,
        }))
    }
}
