use async_trait::async_trait;
use log::debug;

use super::Stage;
use crate::errors::WorkflowError;
use crate::workflow::graph::StageId;
use crate::workflow::state::{ResponseStatus, TranslationState};

/// Terminal stage: resolves the final status and output text
///
/// An active error message always wins over a translation.
pub struct ResponseStage;

#[async_trait]
impl Stage for ResponseStage {
    fn id(&self) -> StageId {
        StageId::Response
    }

    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError> {
        if let Some(message) = state.active_error_message().map(str::to_string) {
            state.translated_text = Some(message);
            state.status = Some(ResponseStatus::Error);
            state.success = Some(false);
        } else {
            state.translated_text = Some(state.translated_text.take().unwrap_or_default());
            state.status = Some(ResponseStatus::Ok);
            state.success = Some(true);
        }

        debug!(
            "Response resolved: status={}, output_len={}",
            state.status.map(|s| s.to_string()).unwrap_or_default(),
            state.translated_text.as_deref().map(|t| t.chars().count()).unwrap_or(0)
        );

        Ok(())
    }
}
