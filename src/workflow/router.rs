//! Routing decisions of the two conditional edges.

use crate::workflow::graph::StageId;
use crate::workflow::state::{QcVerdict, SafeguardLabel, TranslationState};

/// Route after the safeguard decision
///
/// A missing label counts as PASS.
pub fn route_after_safeguard(state: &TranslationState) -> StageId {
    if state.safeguard_label.unwrap_or(SafeguardLabel::Pass).is_pass() {
        StageId::Translate
    } else {
        StageId::SafeguardFail
    }
}

/// Route after the retry gate
///
/// The comparison runs against the retry count as it stands before the next
/// retry increments it.
pub fn route_after_retry_gate(state: &TranslationState) -> StageId {
    if state.qc_passed == Some(QcVerdict::Yes) {
        return StageId::Response;
    }

    if state.retry_count < state.effective_max_retry_count() {
        StageId::RetryTranslate
    } else {
        StageId::Response
    }
}

/// Possible targets of [`route_after_safeguard`]
pub const SAFEGUARD_TARGETS: [StageId; 2] = [StageId::Translate, StageId::SafeguardFail];

/// Possible targets of [`route_after_retry_gate`]
pub const RETRY_GATE_TARGETS: [StageId; 2] = [StageId::Response, StageId::RetryTranslate];
