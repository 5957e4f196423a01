use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

use super::Stage;
use crate::errors::WorkflowError;
use crate::providers::GenerativeCapability;
use crate::workflow::graph::StageId;
use crate::workflow::messages;
use crate::workflow::parsing::normalize_label;
use crate::workflow::prompts;
use crate::workflow::rules::{self, RuleVerdict};
use crate::workflow::state::{AuditEntry, ResponseStatus, SafeguardLabel, TranslationState};

/// Audit event recorded for every block
pub const SAFEGUARD_BLOCK_EVENT: &str = "SAFEGUARD_BLOCK";

/// Assigns exactly one safety label to the text
///
/// Rules decide the clear cases; the capability decides the rest.
pub struct SafeguardClassifyStage {
    capability: Arc<dyn GenerativeCapability>,
}

impl SafeguardClassifyStage {
    pub fn new(capability: Arc<dyn GenerativeCapability>) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl Stage for SafeguardClassifyStage {
    fn id(&self) -> StageId {
        StageId::SafeguardClassify
    }

    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError> {
        let label = match rules::evaluate(&state.text, state.has_sensitive_hint) {
            RuleVerdict::Decided { label, rule } => {
                debug!("Safeguard rule '{}' decided {}", rule, label);
                label
            }
            RuleVerdict::Undecided { prior } => {
                let prompt = prompts::classify_safety(&state.text, prior);
                let response = self
                    .capability
                    .invoke(&prompt)
                    .await
                    .map_err(|e| WorkflowError::capability(self.id(), e))?;
                let label = normalize_label(&response.text(), prior);
                debug!(
                    "Safeguard classifier decided {} (prior: {})",
                    label,
                    prior.map(|p| p.as_str()).unwrap_or("none")
                );
                label
            }
        };

        state.safeguard_label = Some(label);
        Ok(())
    }
}

/// Turns the label into a pass/block decision and a block message
pub struct SafeguardDecisionStage;

#[async_trait]
impl Stage for SafeguardDecisionStage {
    fn id(&self) -> StageId {
        StageId::SafeguardDecision
    }

    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError> {
        // A missing label counts as PASS
        let passed = state.safeguard_label.unwrap_or(SafeguardLabel::Pass).is_pass();
        state.safeguard_passed = Some(passed);

        if passed {
            state.error_message = None;
        } else {
            state.error_message = Some(messages::message_for_label(state.safeguard_label).to_string());
        }

        Ok(())
    }
}

/// Materializes a block: message as output, BLOCKED status and an audit entry
pub struct SafeguardFailStage;

#[async_trait]
impl Stage for SafeguardFailStage {
    fn id(&self) -> StageId {
        StageId::SafeguardFail
    }

    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError> {
        if state.safeguard_passed == Some(true) {
            warn!("Fail-response reached for a passed request, nothing to do");
            return Ok(());
        }

        let message = state
            .active_error_message()
            .map(str::to_string)
            .unwrap_or_else(|| messages::message_for_label(state.safeguard_label).to_string());

        state.translated_text = Some(message);
        state.status = Some(ResponseStatus::Blocked);
        state.blocked_reason = state.safeguard_label;

        if let Some(label) = state.safeguard_label {
            let text_len = state.text.chars().count();
            state.audit_log.push(AuditEntry {
                event: SAFEGUARD_BLOCK_EVENT.to_string(),
                label,
                text_len,
            });
            info!("Request blocked by safeguard: label={}, text_len={}", label, text_len);
        } else {
            info!("Request blocked by safeguard without a label");
        }

        Ok(())
    }
}
