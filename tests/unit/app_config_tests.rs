/*!
 * Tests for app configuration functionality
 */

use anyhow::Result;

use transguard::app_config::{
    Config, LogLevel, TranslationProvider, WorkflowConfig, resolve_api_key,
};
use transguard::workflow::WorkflowSettings;

use crate::common::{create_temp_dir, create_test_file};

/// Test default configuration values
#[test]
fn test_default_config_shouldHaveSensibleValues() {
    let config = Config::default();

    assert_eq!(config.source_language, None);
    assert_eq!(config.target_language, "en");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.available_providers.len(), 4);
    assert_eq!(config.translation.common.retry_count, 2);
    assert_eq!(config.translation.common.temperature, 0.0);
    assert_eq!(config.workflow.max_retry_count, 1);
    assert_eq!(config.workflow.max_text_chars, WorkflowSettings::DEFAULT_MAX_TEXT_CHARS);
    assert_eq!(config.workflow.max_steps, WorkflowSettings::DEFAULT_MAX_STEPS);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_activeProvider_defaults_shouldMatchProviderType() {
    let mut config = Config::default();
    assert_eq!(config.translation.get_model(), "llama3.2:3b");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.get_timeout_secs(), 30);

    config.translation.provider = TranslationProvider::Anthropic;
    assert_eq!(config.translation.get_model(), "claude-3-haiku-20240307");
    assert_eq!(config.translation.get_timeout_secs(), 60);

    config.translation.provider = TranslationProvider::LMStudio;
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
}

#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::OpenAI;

    config.translation.active_provider_config_mut().model = "gpt-4o".to_string();

    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "gpt-4o");
    assert_eq!(config.translation.get_endpoint(), "https://api.openai.com/v1");
}

#[test]
fn test_validate_withBadTargetLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = "english".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withAliasLanguages_shouldPass() {
    let mut config = Config::default();
    config.source_language = Some("KR".to_string());
    config.target_language = "en-US".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withBadSourceLanguage_shouldFail() {
    let mut config = Config::default();
    config.source_language = Some("x1".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withHostedProviderAndNoKey_shouldFail() {
    // Only meaningful when the environment does not supply a key
    if std::env::var("OPENAI_API_KEY").is_ok() {
        return;
    }

    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("API key is required for OpenAI"));

    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withLocalProviders_shouldNotNeedKey() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::LMStudio;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroTextCap_shouldFail() {
    let mut config = Config::default();
    config.workflow.max_text_chars = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withStepLimitBelowRetryPath_shouldFail() {
    let mut config = Config::default();
    config.workflow.max_retry_count = 3;
    config.workflow.max_steps = 15;
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("need at least 16"));

    config.workflow.max_steps = 16;
    assert!(config.validate().is_ok());
}

#[test]
fn test_minSteps_withZeroRetries_shouldCountOneRetry() {
    let workflow = WorkflowConfig {
        max_retry_count: 0,
        ..WorkflowConfig::default()
    };
    assert_eq!(workflow.min_steps(), 10);

    let workflow = WorkflowConfig {
        max_retry_count: 2,
        ..WorkflowConfig::default()
    };
    assert_eq!(workflow.min_steps(), 13);
}

#[test]
fn test_workflowSettings_shouldMirrorConfig() {
    let workflow = WorkflowConfig {
        max_text_chars: 500,
        max_retry_count: 1,
        max_steps: 20,
    };
    let settings = workflow.settings();
    assert_eq!(settings.max_text_chars, 500);
    assert_eq!(settings.max_steps, 20);
}

#[test]
fn test_resolveApiKey_shouldPreferConfiguredKey() {
    let lookup = |name: &str| (name == "OPENAI_API_KEY").then(|| "from-env".to_string());

    assert_eq!(resolve_api_key("configured", Some("OPENAI_API_KEY"), lookup), "configured");
    assert_eq!(resolve_api_key("", Some("OPENAI_API_KEY"), lookup), "from-env");
    assert_eq!(resolve_api_key("", None, lookup), "");
    assert_eq!(resolve_api_key("", Some("OPENAI_API_KEY"), |_| Some(String::new())), "");
}

#[test]
fn test_providerFromStr_shouldBeCaseInsensitive() {
    assert_eq!("OpenAI".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!("lmstudio".parse::<TranslationProvider>().unwrap(), TranslationProvider::LMStudio);
    assert!("deepl".parse::<TranslationProvider>().is_err());
    assert_eq!(TranslationProvider::Anthropic.to_string(), "anthropic");
}

#[test]
fn test_logLevel_toLevelFilter() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}

/// Test saving and loading configuration
#[test]
fn test_save_and_load_config_shouldRoundTrip() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let config_path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.source_language = Some("ko".to_string());
    config.target_language = "ja".to_string();
    config.workflow.max_retry_count = 2;
    config.log_level = LogLevel::Debug;
    config.save(&config_path)?;

    let loaded = Config::from_file(&config_path)?;
    assert_eq!(loaded.source_language.as_deref(), Some("ko"));
    assert_eq!(loaded.target_language, "ja");
    assert_eq!(loaded.workflow, config.workflow);
    assert_eq!(loaded.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let config_path = temp_dir.path().join("nested-conf.json");

    let config = Config::load_or_create(&config_path)?;

    assert!(config_path.exists());
    assert_eq!(config.target_language, "en");
    Ok(())
}

#[test]
fn test_fromFile_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let config_path = create_test_file(
        temp_dir.path(),
        "partial.json",
        r#"{"target_language": "ko", "workflow": {"max_retry_count": 3}}"#,
    )?;

    let config = Config::from_file(&config_path)?;

    assert_eq!(config.target_language, "ko");
    assert_eq!(config.workflow.max_retry_count, 3);
    assert_eq!(config.workflow.max_steps, WorkflowSettings::DEFAULT_MAX_STEPS);
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    Ok(())
}

#[test]
fn test_fromFile_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let config_path = create_test_file(temp_dir.path(), "broken.json", "{ not json")?;

    assert!(Config::from_file(&config_path).is_err());
    Ok(())
}
