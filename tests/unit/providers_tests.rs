/*!
 * Tests for capability responses, provider construction and the scripted capability
 */

use serde_json::json;

use transguard::app_config::{TranslationConfig, TranslationProvider};
use transguard::errors::ProviderError;
use transguard::providers::mock::{MockCapability, MockReply, PromptKind};
use transguard::providers::{CapabilityResponse, GenerativeCapability, build_capability};
use transguard::workflow::prompts;

#[test]
fn test_capabilityResponse_withAnthropicStyleBlocks_shouldJoinTextParts() {
    let response: CapabilityResponse = serde_json::from_value(json!([
        {"type": "text", "text": "line one"},
        {"type": "tool_use"},
        {"type": "text", "text": "line two"}
    ]))
    .unwrap();

    assert_eq!(response.text(), "line one\nline two");
}

#[test]
fn test_capabilityResponse_withOnlyNonTextParts_shouldBeEmpty() {
    let response: CapabilityResponse =
        serde_json::from_value(json!([{"type": "thinking", "text": "hidden"}])).unwrap();
    assert_eq!(response.text(), "");
}

#[test]
fn test_capabilityResponse_withNestedObject_shouldFallBackToJson() {
    let response: CapabilityResponse =
        serde_json::from_value(json!({"answer": "YES"})).unwrap();
    assert_eq!(response.text(), r#"{"answer":"YES"}"#);
}

#[test]
fn test_buildCapability_shouldSelectConfiguredProvider() {
    let mut config = TranslationConfig::default();

    for (provider, name) in [
        (TranslationProvider::Ollama, "ollama"),
        (TranslationProvider::OpenAI, "openai"),
        (TranslationProvider::Anthropic, "anthropic"),
        (TranslationProvider::LMStudio, "lmstudio"),
    ] {
        config.provider = provider;
        let capability = build_capability(&config).unwrap();
        assert_eq!(capability.name(), name);
    }
}

#[test]
fn test_buildCapability_withBadOllamaEndpoint_shouldFail() {
    let mut config = TranslationConfig::default();
    config.provider = TranslationProvider::Ollama;
    config.active_provider_config_mut().endpoint = "http://".to_string();

    assert!(build_capability(&config).is_err());
}

#[test]
fn test_promptKind_withEveryBuilder_shouldBeRecognized() {
    assert_eq!(PromptKind::of(&prompts::detect_language("x")), PromptKind::Detect);
    assert_eq!(PromptKind::of(&prompts::classify_safety("x", None)), PromptKind::Classify);
    assert_eq!(PromptKind::of(&prompts::translate("x", "en", "ko")), PromptKind::Translate);
    assert_eq!(
        PromptKind::of(&prompts::retry_translate("x", "y", "en", "ko")),
        PromptKind::Retry
    );
    assert_eq!(
        PromptKind::of(&prompts::judge_quality("x", "y", "en", "ko")),
        PromptKind::Judge
    );
    assert_eq!(PromptKind::of("free-form question"), PromptKind::Unknown);
}

#[tokio::test]
async fn test_mockCapability_slowReply_shouldStillAnswer() {
    let mock = MockCapability::working().with_default(
        PromptKind::Translate,
        MockReply::Slow {
            delay_ms: 10,
            text: "Hallo".to_string(),
        },
    );

    let response = mock.invoke(&prompts::translate("Hello", "en", "de")).await.unwrap();
    assert_eq!(response.text(), "Hallo");
}

#[tokio::test]
async fn test_mockCapability_failing_shouldReturnApiError() {
    let mock = MockCapability::failing();

    let result = mock.invoke(&prompts::judge_quality("a", "b", "en", "fr")).await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 500, .. })));
    assert_eq!(mock.total_calls(), 1);
}
