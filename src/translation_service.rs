/*!
 * Caller-facing translation service.
 *
 * Seeds a workflow state from a request, runs the graph, and projects the
 * final state into a response. Run-level failures are mapped to a generic
 * error response; their detail only goes to the log.
 */

use anyhow::{Context, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::app_config::Config;
use crate::errors::WorkflowError;
use crate::providers::build_capability;
use crate::workflow::{
    QcVerdict, ResponseStatus, SafeguardLabel, TranslationState, WorkflowGraph,
};

/// User-visible text of a run-level failure
pub const SERVICE_ERROR_MESSAGE: &str =
    "The translation service is temporarily unavailable. Please try again later.";

/// A translation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Source language code, detected when absent
    #[serde(default)]
    pub source_language: Option<String>,
    /// Target language code
    #[serde(default)]
    pub target_language: Option<String>,
    /// Caller's hint that the text may contain personal data
    #[serde(default)]
    pub has_sensitive_hint: bool,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_language: None,
            target_language: None,
            has_sensitive_hint: false,
        }
    }

    pub fn with_languages(
        mut self,
        source_language: Option<&str>,
        target_language: Option<&str>,
    ) -> Self {
        self.source_language = source_language.map(str::to_string);
        self.target_language = target_language.map(str::to_string);
        self
    }
}

/// A translation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    /// True only on the translation path
    pub success: bool,
    /// Final status marker
    pub status: ResponseStatus,
    /// Translation, block message or service error message
    pub translated_text: String,
    /// Source language as resolved by the workflow, else as requested
    pub source_language: Option<String>,
    /// Target language as resolved by the workflow, else as requested
    pub target_language: Option<String>,
    pub safeguard_label: Option<SafeguardLabel>,
    pub qc_passed: Option<QcVerdict>,
    pub retry_count: u32,
    /// Non-fatal notice such as truncation
    pub warning_message: Option<String>,
}

impl TranslationResponse {
    /// Generic failure response, free of internal detail
    pub fn service_error(request: &TranslationRequest) -> Self {
        Self {
            success: false,
            status: ResponseStatus::Error,
            translated_text: SERVICE_ERROR_MESSAGE.to_string(),
            source_language: request.source_language.clone(),
            target_language: request.target_language.clone(),
            safeguard_label: None,
            qc_passed: None,
            retry_count: 0,
            warning_message: None,
        }
    }

    fn from_state(state: TranslationState, request: &TranslationRequest) -> Self {
        let projection = state.retained();
        Self {
            success: projection.success,
            status: projection.status.unwrap_or(ResponseStatus::Error),
            translated_text: projection.translated_text,
            source_language: state
                .source_language
                .or_else(|| request.source_language.clone()),
            target_language: state
                .target_language
                .or_else(|| request.target_language.clone()),
            safeguard_label: projection.safeguard_label,
            qc_passed: projection.qc_passed,
            retry_count: projection.retry_count,
            warning_message: state.warning_message,
        }
    }
}

/// Translation service backed by a compiled workflow graph
#[derive(Debug)]
pub struct TranslationService {
    graph: WorkflowGraph,
    /// Retry budget seeded into every state
    max_retry_count: u32,
    /// Languages used when a request leaves them out
    default_source_language: Option<String>,
    default_target_language: Option<String>,
}

impl TranslationService {
    /// Create a service around a graph
    pub fn new(graph: WorkflowGraph, max_retry_count: u32) -> Self {
        Self {
            graph,
            max_retry_count,
            default_source_language: None,
            default_target_language: None,
        }
    }

    /// Set the languages used when a request has none
    pub fn with_default_languages(
        mut self,
        source_language: Option<String>,
        target_language: Option<String>,
    ) -> Self {
        self.default_source_language = source_language;
        self.default_target_language = target_language;
        self
    }

    /// Build the configured provider and the standard graph
    pub fn from_config(config: &Config) -> Result<Self> {
        let capability = build_capability(&config.translation)
            .context("Failed to create generative capability")?;
        let graph = WorkflowGraph::standard(capability, config.workflow.settings())
            .context("Failed to compile translation workflow")?;

        info!(
            "Translation service ready: provider={}, model={}",
            config.translation.provider,
            config.translation.get_model()
        );

        Ok(Self::new(graph, config.workflow.max_retry_count).with_default_languages(
            config.source_language.clone(),
            Some(config.target_language.clone()),
        ))
    }

    /// Fill in the service defaults for missing languages
    fn resolve_request(&self, mut request: TranslationRequest) -> TranslationRequest {
        if request.source_language.is_none() {
            request.source_language = self.default_source_language.clone();
        }
        if request.target_language.is_none() {
            request.target_language = self.default_target_language.clone();
        }
        request
    }

    /// Initial state for a request
    fn seed_state(&self, request: &TranslationRequest) -> TranslationState {
        TranslationState {
            text: request.text.clone(),
            source_language: request.source_language.clone(),
            target_language: request.target_language.clone(),
            has_sensitive_hint: request.has_sensitive_hint,
            retry_count: 0,
            max_retry_count: self.max_retry_count,
            ..Default::default()
        }
    }

    /// Run the workflow and return the run-level error, if any
    pub async fn try_translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResponse, WorkflowError> {
        let request = self.resolve_request(request);
        let state = self.graph.run(self.seed_state(&request)).await?;
        Ok(TranslationResponse::from_state(state, &request))
    }

    /// Run the workflow; failures become a generic error response
    pub async fn translate(&self, request: TranslationRequest) -> TranslationResponse {
        let request = self.resolve_request(request);
        match self.graph.run(self.seed_state(&request)).await {
            Ok(state) => TranslationResponse::from_state(state, &request),
            Err(e) => {
                error!("Translation run failed: {}", e);
                TranslationResponse::service_error(&request)
            }
        }
    }
}
