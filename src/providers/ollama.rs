use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{CapabilityResponse, ClientSettings, GenerativeCapability, http_client, send_json};
use crate::errors::ProviderError;

/// Ollama client for interacting with the local Ollama API
#[derive(Debug)]
pub struct OllamaClient {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model, temperature, timeout and retry settings
    settings: ClientSettings,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// Additional model parameters
    options: GenerationOptions,
    /// Whether to stream the response
    stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    temperature: f32,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Parse an endpoint string into a base URL with scheme and port
fn parse_endpoint(endpoint: &str) -> Result<String> {
    if endpoint.trim().is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?;
    let port = url.port().unwrap_or(11434);

    Ok(format!("{}://{}:{}", url.scheme(), host, port))
}

impl OllamaClient {
    /// Create a new Ollama client for the given endpoint
    pub fn new(endpoint: &str, settings: ClientSettings) -> Result<Self> {
        Ok(Self {
            base_url: parse_endpoint(endpoint)?,
            client: http_client(settings.timeout_secs),
            settings,
        })
    }

    /// Base URL the client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a single non-streaming generation
    pub async fn generate(&self, prompt: &str) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerationRequest {
            model: self.settings.model.clone(),
            prompt: prompt.to_string(),
            options: GenerationOptions {
                temperature: self.settings.temperature,
            },
            stream: false,
        };

        send_json(
            "Ollama",
            || self.client.post(&url).json(&request),
            self.settings.retry,
            self.settings.timeout_secs,
        )
        .await
    }
}

#[async_trait]
impl GenerativeCapability for OllamaClient {
    async fn invoke(&self, prompt: &str) -> Result<CapabilityResponse, ProviderError> {
        let response = self.generate(prompt).await?;
        log::debug!(
            "Ollama generation done={} prompt_tokens={:?} completion_tokens={:?}",
            response.done,
            response.prompt_eval_count,
            response.eval_count
        );
        Ok(CapabilityResponse::Text(response.response))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
