/*!
 * Error types for the transguard application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::workflow::StageId;

/// Errors that can occur when invoking a generative capability
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The capability did not answer within the configured bound
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that abort a workflow run
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A stage needed the generative capability and it failed
    #[error("Capability failure in stage {stage}: {source}")]
    Capability {
        /// Stage that issued the call
        stage: StageId,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// A stage name that the graph does not know
    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    /// A stage was registered without an outgoing edge
    #[error("Stage {0} has no outgoing edge")]
    MissingEdge(StageId),

    /// A stage is reachable by an edge but was never registered
    #[error("Stage {0} is referenced but not registered")]
    MissingStage(StageId),

    /// The runner visited more stages than allowed
    #[error("Workflow exceeded the step limit of {limit}")]
    StepLimitExceeded {
        /// Configured ceiling
        limit: usize,
    },
}

impl WorkflowError {
    /// Wrap a provider failure with the stage that observed it
    pub fn capability(stage: StageId, source: ProviderError) -> Self {
        Self::Capability { stage, source }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the translation workflow
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
