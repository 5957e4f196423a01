use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use super::Stage;
use crate::errors::WorkflowError;
use crate::providers::GenerativeCapability;
use crate::workflow::graph::StageId;
use crate::workflow::parsing::clean_translation;
use crate::workflow::prompts;
use crate::workflow::state::TranslationState;

/// Source language used when none is known
pub const DEFAULT_SOURCE_LANGUAGE: &str = "auto";

/// Target language used when none was given
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// Source and target codes with defaults applied
pub(crate) fn language_pair(state: &TranslationState) -> (&str, &str) {
    (
        state
            .source_language
            .as_deref()
            .unwrap_or(DEFAULT_SOURCE_LANGUAGE),
        state
            .target_language
            .as_deref()
            .unwrap_or(DEFAULT_TARGET_LANGUAGE),
    )
}

/// Store a translation as both the current and the last attempt
fn record_translation(state: &mut TranslationState, translation: String) {
    state.last_translation = Some(translation.clone());
    state.translated_text = Some(translation);
}

/// First-pass translation
pub struct TranslateStage {
    capability: Arc<dyn GenerativeCapability>,
}

impl TranslateStage {
    pub fn new(capability: Arc<dyn GenerativeCapability>) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl Stage for TranslateStage {
    fn id(&self) -> StageId {
        StageId::Translate
    }

    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError> {
        if state.text.trim().is_empty() {
            state.translated_text = Some(String::new());
            return Ok(());
        }

        let (source, target) = language_pair(state);
        let prompt = prompts::translate(&state.text, source, target);
        debug!("Translating {} chars {} -> {}", state.text.chars().count(), source, target);

        let response = self
            .capability
            .invoke(&prompt)
            .await
            .map_err(|e| WorkflowError::capability(self.id(), e))?;

        record_translation(state, clean_translation(&response.text()));
        Ok(())
    }
}

/// Corrective translation after a failed quality check
///
/// Counts the attempt before doing anything else, so an empty input still
/// consumes retry budget.
pub struct RetryTranslateStage {
    capability: Arc<dyn GenerativeCapability>,
}

impl RetryTranslateStage {
    pub fn new(capability: Arc<dyn GenerativeCapability>) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl Stage for RetryTranslateStage {
    fn id(&self) -> StageId {
        StageId::RetryTranslate
    }

    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError> {
        state.retry_count += 1;
        info!(
            "Retrying translation, attempt {}/{}",
            state.retry_count,
            state.effective_max_retry_count()
        );

        if state.text.trim().is_empty() {
            state.translated_text = Some(String::new());
            return Ok(());
        }

        let (source, target) = language_pair(state);
        let previous = state.translated_text.as_deref().unwrap_or_default();
        let prompt = prompts::retry_translate(&state.text, previous, source, target);

        let response = self
            .capability
            .invoke(&prompt)
            .await
            .map_err(|e| WorkflowError::capability(self.id(), e))?;

        record_translation(state, clean_translation(&response.text()));
        Ok(())
    }
}
