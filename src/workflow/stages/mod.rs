/*!
 * Workflow stages.
 *
 * Each stage reads the state, may call the generative capability, and writes
 * its results back into the same state. Expected conditions (empty input, a
 * safety block, a failed quality check) are recorded in the state and left to
 * the routers; only infrastructure failures are returned as errors.
 */

use async_trait::async_trait;

use crate::errors::WorkflowError;
use crate::workflow::graph::StageId;
use crate::workflow::state::TranslationState;

mod normalize;
mod quality;
mod response;
mod retry_gate;
mod safeguard;
mod translate;

pub use normalize::{NormalizeStage, normalize_text};
pub use quality::QualityCheckStage;
pub use response::ResponseStage;
pub use retry_gate::RetryGateStage;
pub use safeguard::{SafeguardClassifyStage, SafeguardDecisionStage, SafeguardFailStage};
pub use translate::{RetryTranslateStage, TranslateStage};

/// A single step of the workflow
#[async_trait]
pub trait Stage: Send + Sync {
    /// Id the stage is registered under
    fn id(&self) -> StageId;

    /// Run the stage against the shared state
    async fn apply(&self, state: &mut TranslationState) -> Result<(), WorkflowError>;
}
