use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::Stage;
use super::translate::language_pair;
use crate::errors::WorkflowError;
use crate::providers::GenerativeCapability;
use crate::workflow::graph::StageId;
use crate::workflow::parsing::normalize_yes_no;
use crate::workflow::prompts;
use crate::workflow::state::{QcVerdict, TranslationState};

/// Reason recorded when a translation came back empty
pub const EMPTY_TRANSLATION_REASON: &str = "empty_translation";

/// Reason recorded when the judge answered NO
pub const QC_FAILED_REASON: &str = "qc_failed";

/// Binary quality gate over the current translation
pub struct QualityCheckStage {
    capability: Arc<dyn GenerativeCapability>,
}

impl QualityCheckStage {
    pub fn new(capability: Arc<dyn GenerativeCapability>) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl Stage for QualityCheckStage {
    fn id(&self) -> StageId {
        StageId::QualityCheck
    }

    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError> {
        // Nothing to translate is trivially acceptable
        if state.text.trim().is_empty() {
            state.qc_passed = Some(QcVerdict::Yes);
            return Ok(());
        }

        let translated = state.translated_text.as_deref().unwrap_or_default();
        if translated.trim().is_empty() {
            debug!("Quality check failed without a call: empty translation");
            state.qc_passed = Some(QcVerdict::No);
            state.qc_reason = Some(EMPTY_TRANSLATION_REASON.to_string());
            return Ok(());
        }

        let (source, target) = language_pair(state);
        let prompt = prompts::judge_quality(&state.text, translated, source, target);

        let response = self
            .capability
            .invoke(&prompt)
            .await
            .map_err(|e| WorkflowError::capability(self.id(), e))?;

        let verdict = normalize_yes_no(&response.text());
        debug!("Quality check verdict: {}", verdict);

        state.qc_passed = Some(verdict);
        state.qc_reason = match verdict {
            QcVerdict::Yes => None,
            QcVerdict::No => Some(QC_FAILED_REASON.to_string()),
        };

        Ok(())
    }
}
