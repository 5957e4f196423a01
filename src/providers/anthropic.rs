use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    CapabilityResponse, ClientSettings, ContentPart, GenerativeCapability, http_client, send_json,
};
use crate::errors::ProviderError;

/// Anthropic client for interacting with the Anthropic messages API
#[derive(Debug)]
pub struct AnthropicClient {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
    /// Model, temperature, timeout and retry settings
    settings: ClientSettings,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// Temperature for generation
    temperature: f32,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content blocks of the response
    pub content: Vec<AnthropicContent>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The text content, absent for non-text blocks
    #[serde(default)]
    pub text: Option<String>,
}

impl AnthropicClient {
    /// Upper bound on generated tokens; translations are capped at 10k chars of input
    const MAX_TOKENS: u32 = 8192;

    /// Create a new Anthropic client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, settings: ClientSettings) -> Self {
        Self {
            client: http_client(settings.timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            settings,
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Complete a messages request
    pub async fn complete(&self, prompt: &str) -> Result<AnthropicResponse, ProviderError> {
        let api_url = self.api_url();
        let request = AnthropicRequest {
            model: self.settings.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.settings.temperature,
            max_tokens: Self::MAX_TOKENS,
        };

        send_json(
            "Anthropic",
            || {
                self.client
                    .post(&api_url)
                    .header("Content-Type", "application/json")
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", "2023-06-01")
                    .json(&request)
            },
            self.settings.retry,
            self.settings.timeout_secs,
        )
        .await
    }
}

/// Convert content blocks into typed parts; text extraction happens later
fn into_parts(response: AnthropicResponse) -> CapabilityResponse {
    CapabilityResponse::Parts(
        response
            .content
            .into_iter()
            .map(|block| ContentPart::Typed {
                kind: block.content_type,
                text: block.text,
            })
            .collect(),
    )
}

#[async_trait]
impl GenerativeCapability for AnthropicClient {
    async fn invoke(&self, prompt: &str) -> Result<CapabilityResponse, ProviderError> {
        let response = self.complete(prompt).await?;
        if let Some(usage) = &response.usage {
            log::debug!(
                "Anthropic usage: {} input / {} output tokens",
                usage.input_tokens,
                usage.output_tokens
            );
        }
        Ok(into_parts(response))
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
