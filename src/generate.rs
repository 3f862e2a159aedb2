//! Text generation behind a single explicit success/failure contract
//!
//! Every failure mode (transport, HTTP status, empty completion) surfaces
//! as `Error::Generation`; there is no apology-string or empty-string
//! convention for callers to sniff.

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Black-box text generator used for debate turns
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for a prompt with the given model identifier
    async fn generate(&self, prompt: &str, model: &str) -> Result<String>;
}

/// Message in a chat-completion conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
}

/// Chat-completion request
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat-completion response
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    /// Choices
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// Choice in a completion response
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Message content
    pub message: Message,
}

/// OpenRouter-backed generator.
///
/// The HTTP client is built without a request timeout: a hung generation
/// blocks its session until the server gives up. Known gap; drive sessions
/// through the step-wise `DebateRun` if callers need to bound turns.
pub struct OpenRouterGenerator {
    http: Client,
    config: GeneratorConfig,
}

impl OpenRouterGenerator {
    /// Create a generator from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GeneratorConfig::from_env()?)
    }

    /// Create a generator with the given configuration
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

#[async_trait]
impl Generator for OpenRouterGenerator {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.as_str().trim_end_matches('/')
        );
        let request = CompletionRequest {
            model: model.to_string(),
            messages: vec![Message::user(prompt)],
            temperature: Some(self.config.temperature),
        };

        debug!(model, prompt_len = prompt.len(), "sending completion request");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("X-Title", &self.config.app_name)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(format!("transport failure: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::generation(format!(
                "completion request failed with status {status}: {body}"
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("malformed completion response: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(Error::generation("empty completion"));
        }

        Ok(content)
    }
}
