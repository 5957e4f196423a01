use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CapabilityResponse, ClientSettings, GenerativeCapability, http_client, send_json};
use crate::errors::ProviderError;

/// Client for OpenAI-compatible chat completion APIs (OpenAI, LM Studio)
#[derive(Debug)]
pub struct OpenAiClient {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base endpoint, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model, temperature, timeout and retry settings
    settings: ClientSettings,
    /// Provider name reported in logs
    name: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,
    /// Conversation messages
    messages: Vec<OpenAIMessage>,
    /// Temperature for generation
    temperature: f32,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the sender
    pub role: String,
    /// Message text
    pub content: String,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// Generated message
    pub message: OpenAIMessage,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Generated choices, the first one is used
    pub choices: Vec<OpenAIChoice>,
    /// Token usage, not reported by every compatible server
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl OpenAiClient {
    /// Create a new OpenAI-compatible client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, settings: ClientSettings) -> Self {
        Self {
            client: http_client(settings.timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            settings,
            name: "openai".to_string(),
        }
    }

    /// Override the provider name used in logs
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1/chat/completions".to_string()
        } else {
            format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Complete a chat request with a single user message
    pub async fn complete(&self, prompt: &str) -> Result<OpenAIResponse, ProviderError> {
        let api_url = self.api_url();
        let request = OpenAIRequest {
            model: self.settings.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.settings.temperature,
        };

        send_json(
            &self.name,
            || {
                self.client
                    .post(&api_url)
                    .bearer_auth(&self.api_key)
                    .json(&request)
            },
            self.settings.retry,
            self.settings.timeout_secs,
        )
        .await
    }
}

#[async_trait]
impl GenerativeCapability for OpenAiClient {
    async fn invoke(&self, prompt: &str) -> Result<CapabilityResponse, ProviderError> {
        let response = self.complete(prompt).await?;

        if let Some(usage) = &response.usage {
            log::debug!(
                "{} usage: {} prompt / {} completion / {} total tokens",
                self.name,
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| CapabilityResponse::Text(choice.message.content))
            .ok_or_else(|| ProviderError::ParseError(format!("{} returned no choices", self.name)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
