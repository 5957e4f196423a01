/*!
 * Generative capability providers.
 *
 * The workflow talks to a text-generation service through the narrow
 * [`GenerativeCapability`] trait: one prompt in, one response out, or an
 * explicit failure. This module contains the client implementations:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 * - Mock: scripted capability for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

/// Common trait for every generative capability
///
/// Implementations must either return a response or fail within their own
/// configured timeout; the workflow never cancels a call itself.
#[async_trait]
pub trait GenerativeCapability: Send + Sync + Debug {
    /// Send a single prompt and wait for the answer
    ///
    /// # Arguments
    /// * `prompt` - The complete instruction, including the text to work on
    ///
    /// # Returns
    /// * `Result<CapabilityResponse, ProviderError>` - The raw response payload or an error
    async fn invoke(&self, prompt: &str) -> Result<CapabilityResponse, ProviderError>;

    /// Short provider name used in logs
    fn name(&self) -> &str;
}

/// One element of a structured response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    /// Typed block, e.g. `{"type": "text", "text": "..."}`
    Typed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        text: Option<String>,
    },
    /// Bare string inside a list
    Plain(String),
    /// Untyped object or any other value, ignored on extraction
    Other(serde_json::Value),
}

/// Raw response payload of a capability call
///
/// Providers disagree on shape: some return a plain string, some a list of
/// typed content blocks, some an object with a `text` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityResponse {
    /// Plain string payload
    Text(String),
    /// Sequence of content parts
    Parts(Vec<ContentPart>),
    /// Single object carrying a text field
    Object { text: String },
    /// Anything else
    Other(serde_json::Value),
}

impl CapabilityResponse {
    /// Extract the text payload
    ///
    /// Only "text" typed parts (and bare strings) of a part list are kept,
    /// newline-joined in order. Unknown shapes fall back to their JSON form.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Typed { kind, text } if kind == "text" => text.as_deref(),
                    ContentPart::Typed { .. } => None,
                    ContentPart::Plain(text) => Some(text.as_str()),
                    ContentPart::Other(_) => None,
                })
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string(),
            Self::Object { text } => text.trim().to_string(),
            Self::Other(serde_json::Value::String(text)) => text.trim().to_string(),
            Self::Other(value) => value.to_string().trim().to_string(),
        }
    }
}

impl From<String> for CapabilityResponse {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for CapabilityResponse {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Settings shared by every HTTP client
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout, the capability-boundary bound
    pub timeout_secs: u64,
    /// Transient failure retry policy
    pub retry: RetryPolicy,
}

/// Build the HTTP client used by the provider clients
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

/// Build the capability selected by the configuration
pub fn build_capability(config: &TranslationConfig) -> anyhow::Result<Arc<dyn GenerativeCapability>> {
    let endpoint = config.get_endpoint();
    let settings = ClientSettings {
        model: config.get_model(),
        temperature: config.common.temperature,
        timeout_secs: config.get_timeout_secs(),
        retry: RetryPolicy {
            max_retries: config.common.retry_count,
            backoff_base_ms: config.common.retry_backoff_ms,
        },
    };

    let capability: Arc<dyn GenerativeCapability> = match config.provider {
        TranslationProvider::Ollama => Arc::new(ollama::OllamaClient::new(&endpoint, settings)?),
        TranslationProvider::OpenAI => Arc::new(openai::OpenAiClient::new(
            config.get_api_key(),
            endpoint,
            settings,
        )),
        TranslationProvider::LMStudio => {
            // LM Studio usually runs without a key
            let api_key = {
                let k = config.get_api_key();
                if k.is_empty() { "lm-studio".to_string() } else { k }
            };
            Arc::new(openai::OpenAiClient::new(api_key, endpoint, settings).with_name("lmstudio"))
        }
        TranslationProvider::Anthropic => Arc::new(anthropic::AnthropicClient::new(
            config.get_api_key(),
            endpoint,
            settings,
        )),
    };

    Ok(capability)
}

/// Retry policy shared by the HTTP clients
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base backoff, doubled on each retry
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

/// Send a JSON request and decode a JSON response, retrying transient failures
///
/// Transport errors, 5xx and 429 responses are retried with exponential backoff.
/// Other client errors and undecodable bodies fail immediately.
pub(crate) async fn send_json<R, F>(
    provider: &str,
    build_request: F,
    retry: RetryPolicy,
    timeout_secs: u64,
) -> Result<R, ProviderError>
where
    R: serde::de::DeserializeOwned,
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        let outcome = match build_request().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response
                        .json::<R>()
                        .await
                        .map_err(|e| ProviderError::ParseError(format!("{} response: {}", provider, e)));
                }

                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to get error response text".to_string());
                let error = map_status_error(status, body);
                if !(status.is_server_error() || status.as_u16() == 429) {
                    log::error!("{} API error ({}): {}", provider, status, error);
                    return Err(error);
                }
                error
            }
            Err(e) => map_transport_error(e, timeout_secs),
        };

        if attempt >= retry.max_retries {
            log::error!("{} request failed after {} attempt(s): {}", provider, attempt + 1, outcome);
            return Err(outcome);
        }

        attempt += 1;
        let backoff_ms = retry.backoff_base_ms * (1u64 << (attempt - 1));
        log::warn!(
            "{} request failed ({}), retrying in {}ms - attempt {}/{}",
            provider,
            outcome,
            backoff_ms,
            attempt + 1,
            retry.max_retries + 1
        );
        tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
    }
}

/// Map a reqwest transport failure onto a provider error
pub(crate) fn map_transport_error(error: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map a non-success HTTP status onto a provider error
pub(crate) fn map_status_error(status: reqwest::StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(body),
        429 => ProviderError::RateLimitExceeded(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}
