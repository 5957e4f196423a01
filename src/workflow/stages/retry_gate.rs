use async_trait::async_trait;
use log::debug;

use super::Stage;
use crate::errors::WorkflowError;
use crate::workflow::graph::StageId;
use crate::workflow::state::{QcVerdict, TranslationState};

/// Reason recorded when another attempt is allowed
pub const RETRY_AVAILABLE_REASON: &str = "qc_failed_retry_available";

/// Reason recorded when the budget is spent
pub const MAX_RETRY_REACHED_REASON: &str = "max_retry_reached";

/// Records whether another corrective attempt is allowed
///
/// Only writes state; the branch itself is taken by the router on the
/// outgoing edge.
pub struct RetryGateStage;

#[async_trait]
impl Stage for RetryGateStage {
    fn id(&self) -> StageId {
        StageId::RetryGate
    }

    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError> {
        // Persist the defaulted budget so later reads agree with this one
        state.max_retry_count = state.effective_max_retry_count();

        if state.qc_passed == Some(QcVerdict::Yes) {
            state.retry_allowed = Some(false);
            state.retry_reason = None;
            return Ok(());
        }

        let allowed = state.retry_count < state.max_retry_count;
        state.retry_allowed = Some(allowed);
        state.retry_reason = Some(
            if allowed {
                RETRY_AVAILABLE_REASON
            } else {
                MAX_RETRY_REACHED_REASON
            }
            .to_string(),
        );

        debug!(
            "Retry gate: allowed={}, retries={}/{}",
            allowed, state.retry_count, state.max_retry_count
        );

        Ok(())
    }
}
