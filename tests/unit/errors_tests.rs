/*!
 * Tests for error types and conversions
 */

use std::error::Error;

use transguard::errors::{AppError, ProviderError, WorkflowError};
use transguard::workflow::StageId;

#[test]
fn test_providerError_display_shouldIncludeDetails() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "overloaded".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 503 - overloaded");

    let error = ProviderError::Timeout(30);
    assert_eq!(error.to_string(), "Request timed out after 30 seconds");
}

#[test]
fn test_workflowError_capability_shouldKeepStageAndSource() {
    let error = WorkflowError::capability(
        StageId::QualityCheck,
        ProviderError::ConnectionError("refused".to_string()),
    );

    assert_eq!(
        error.to_string(),
        "Capability failure in stage quality_check: Connection error: refused"
    );
    let source = error.source().expect("capability error should expose its source");
    assert_eq!(source.to_string(), "Connection error: refused");
}

#[test]
fn test_workflowError_graphVariants_shouldNameTheStage() {
    assert_eq!(
        WorkflowError::MissingEdge(StageId::RetryGate).to_string(),
        "Stage retry_gate has no outgoing edge"
    );
    assert_eq!(
        WorkflowError::MissingStage(StageId::Translate).to_string(),
        "Stage translate is referenced but not registered"
    );
    assert_eq!(
        WorkflowError::StepLimitExceeded { limit: 13 }.to_string(),
        "Workflow exceeded the step limit of 13"
    );
}

#[test]
fn test_appError_fromProviderError_shouldWrap() {
    let error: AppError = ProviderError::RateLimitExceeded("slow down".to_string()).into();
    assert!(matches!(error, AppError::Provider(_)));
    assert_eq!(error.to_string(), "Provider error: Rate limit exceeded: slow down");
}

#[test]
fn test_appError_fromWorkflowError_shouldWrap() {
    let error: AppError = WorkflowError::StepLimitExceeded { limit: 4 }.into();
    assert!(matches!(error, AppError::Workflow(WorkflowError::StepLimitExceeded { limit: 4 })));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "conf.json missing");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(ref msg) if msg.contains("conf.json missing")));
}

#[test]
fn test_appError_fromAnyhow_shouldBecomeUnknown() {
    let error: AppError = anyhow::anyhow!("something odd").into();
    assert_eq!(error.to_string(), "Unknown error: something odd");
}
