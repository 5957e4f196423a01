/*!
 * Guarded translation workflow.
 *
 * A request passes through a fixed graph of stages that share one
 * [`TranslationState`]:
 * - `stages`: the nine workflow steps
 * - `graph`: builder, compiler and runner with fixed and conditional edges
 * - `router`: the two branch decisions
 * - `rules`: deterministic safety rules run before the model classifier
 * - `parsing`: normalization of free-form capability answers
 * - `prompts`: instructions sent to the generative capability
 * - `messages`: user-facing block messages
 * - `state`: the shared state record
 */

pub mod graph;
pub mod messages;
pub mod parsing;
pub mod prompts;
pub mod router;
pub mod rules;
pub mod stages;
pub mod state;

pub use graph::{GraphBuilder, RetryAllowance, StageId, WorkflowGraph};
pub use stages::Stage;
pub use state::{
    AuditEntry, QcVerdict, ResponseProjection, ResponseStatus, SafeguardLabel, TranslationState,
};

/// Tunables of the standard graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Input length cap in characters
    pub max_text_chars: usize,
    /// Ceiling on stage executions per run
    pub max_steps: usize,
}

impl WorkflowSettings {
    pub const DEFAULT_MAX_TEXT_CHARS: usize = 10_000;
    pub const DEFAULT_MAX_STEPS: usize = 32;
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            max_text_chars: Self::DEFAULT_MAX_TEXT_CHARS,
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }
}
