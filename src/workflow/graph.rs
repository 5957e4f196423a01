/*!
 * Workflow graph definition, compilation and execution.
 *
 * A graph is a set of stages keyed by [`StageId`] plus one outgoing edge per
 * stage. Edges are either fixed or conditional; a conditional edge names the
 * stages its router may choose so that compilation can check them.
 *
 * The virtual `Start` and `End` ids are never registered as stages: `Start`
 * only has an outgoing edge and reaching `End` finishes the run.
 */

use log::{debug, error, info};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::WorkflowError;
use crate::providers::GenerativeCapability;
use crate::workflow::router::{
    RETRY_GATE_TARGETS, SAFEGUARD_TARGETS, route_after_retry_gate, route_after_safeguard,
};
use crate::workflow::stages::{
    NormalizeStage, QualityCheckStage, ResponseStage, RetryGateStage, RetryTranslateStage,
    SafeguardClassifyStage, SafeguardDecisionStage, SafeguardFailStage, Stage, TranslateStage,
};
use crate::workflow::state::TranslationState;
use crate::workflow::WorkflowSettings;

/// Identifier of a workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Virtual entry point
    Start,
    Normalize,
    SafeguardClassify,
    SafeguardDecision,
    SafeguardFail,
    Translate,
    QualityCheck,
    RetryGate,
    RetryTranslate,
    Response,
    /// Virtual exit point
    End,
}

impl StageId {
    /// Every id, virtual ones included
    pub const ALL: [StageId; 11] = [
        StageId::Start,
        StageId::Normalize,
        StageId::SafeguardClassify,
        StageId::SafeguardDecision,
        StageId::SafeguardFail,
        StageId::Translate,
        StageId::QualityCheck,
        StageId::RetryGate,
        StageId::RetryTranslate,
        StageId::Response,
        StageId::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Normalize => "normalize",
            Self::SafeguardClassify => "safeguard_classify",
            Self::SafeguardDecision => "safeguard_decision",
            Self::SafeguardFail => "safeguard_fail",
            Self::Translate => "translate",
            Self::QualityCheck => "quality_check",
            Self::RetryGate => "retry_gate",
            Self::RetryTranslate => "retry_translate",
            Self::Response => "response",
            Self::End => "end",
        }
    }

    /// True for `Start` and `End`
    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::Start | Self::End)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| WorkflowError::UnknownStage(s.to_string()))
    }
}

/// Router of a conditional edge
pub type Router = fn(&TranslationState) -> StageId;

/// Outgoing edge of a stage
#[derive(Debug, Clone)]
pub enum Edge {
    /// Always continue to the same stage
    Fixed(StageId),
    /// Let a router pick among the listed targets
    Conditional { router: Router, targets: Vec<StageId> },
}

impl Edge {
    fn targets(&self) -> Vec<StageId> {
        match self {
            Self::Fixed(to) => vec![*to],
            Self::Conditional { targets, .. } => targets.clone(),
        }
    }
}

/// Stage executions a graph with a retry loop needs for a given budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAllowance {
    /// Stages on the longest path without retries
    pub base_steps: usize,
    /// Stages added by each retry
    pub steps_per_retry: usize,
}

impl RetryAllowance {
    /// Allowance of the standard graph: seven stages, plus retry, quality
    /// check and gate per retry
    pub const STANDARD: RetryAllowance = RetryAllowance {
        base_steps: 7,
        steps_per_retry: 3,
    };

    /// Smallest step ceiling that lets every retry of the budget run
    pub fn required_steps(&self, max_retry_count: u32) -> usize {
        self.base_steps + self.steps_per_retry * max_retry_count.max(1) as usize
    }
}

/// Builder for a [`WorkflowGraph`]
#[derive(Default)]
pub struct GraphBuilder {
    stages: HashMap<StageId, Arc<dyn Stage>>,
    edges: HashMap<StageId, Edge>,
    max_steps: Option<usize>,
    retry_allowance: Option<RetryAllowance>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage under its own id
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.insert(stage.id(), Arc::new(stage));
        self
    }

    /// Add a fixed edge, replacing any previous edge of `from`
    pub fn add_edge(mut self, from: StageId, to: StageId) -> Self {
        self.edges.insert(from, Edge::Fixed(to));
        self
    }

    /// Add a conditional edge, replacing any previous edge of `from`
    pub fn add_conditional_edge(
        mut self,
        from: StageId,
        router: Router,
        targets: impl IntoIterator<Item = StageId>,
    ) -> Self {
        self.edges.insert(
            from,
            Edge::Conditional {
                router,
                targets: targets.into_iter().collect(),
            },
        );
        self
    }

    /// Cap the number of stage executions per run
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Raise the step ceiling of a run to what its retry budget needs
    pub fn with_retry_allowance(mut self, allowance: RetryAllowance) -> Self {
        self.retry_allowance = Some(allowance);
        self
    }

    /// Validate the wiring and produce a runnable graph
    ///
    /// Every registered stage and `Start` needs an outgoing edge, and every
    /// edge target other than `End` must be registered.
    pub fn compile(self) -> Result<WorkflowGraph, WorkflowError> {
        if !self.edges.contains_key(&StageId::Start) {
            return Err(WorkflowError::MissingEdge(StageId::Start));
        }

        let mut registered: Vec<StageId> = self.stages.keys().copied().collect();
        registered.sort_by_key(|id| id.as_str());
        for id in registered {
            if !self.edges.contains_key(&id) {
                return Err(WorkflowError::MissingEdge(id));
            }
        }

        for edge in self.edges.values() {
            for target in edge.targets() {
                if target != StageId::End && !self.stages.contains_key(&target) {
                    return Err(WorkflowError::MissingStage(target));
                }
            }
        }

        Ok(WorkflowGraph {
            stages: self.stages,
            edges: self.edges,
            max_steps: self.max_steps.unwrap_or(WorkflowSettings::DEFAULT_MAX_STEPS),
            retry_allowance: self.retry_allowance,
        })
    }
}

/// Compiled, runnable workflow
///
/// The graph holds no per-run data and can serve any number of runs.
pub struct WorkflowGraph {
    stages: HashMap<StageId, Arc<dyn Stage>>,
    edges: HashMap<StageId, Edge>,
    max_steps: usize,
    retry_allowance: Option<RetryAllowance>,
}

impl fmt::Debug for WorkflowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowGraph")
            .field("stages", &self.stages.len())
            .field("edges", &self.edges)
            .field("max_steps", &self.max_steps)
            .field("retry_allowance", &self.retry_allowance)
            .finish()
    }
}

impl WorkflowGraph {
    /// Wire the guarded translation workflow
    ///
    /// ```text
    /// Start -> Normalize -> SafeguardClassify -> SafeguardDecision
    ///   PASS  -> Translate -> QualityCheck -> RetryGate
    ///              YES or budget spent -> Response -> End
    ///              otherwise -> RetryTranslate -> QualityCheck
    ///   other -> SafeguardFail -> Response -> End
    /// ```
    pub fn standard(
        capability: Arc<dyn GenerativeCapability>,
        settings: WorkflowSettings,
    ) -> Result<Self, WorkflowError> {
        GraphBuilder::new()
            .add_stage(NormalizeStage::new(capability.clone(), settings.max_text_chars))
            .add_stage(SafeguardClassifyStage::new(capability.clone()))
            .add_stage(SafeguardDecisionStage)
            .add_stage(SafeguardFailStage)
            .add_stage(TranslateStage::new(capability.clone()))
            .add_stage(QualityCheckStage::new(capability.clone()))
            .add_stage(RetryGateStage)
            .add_stage(RetryTranslateStage::new(capability))
            .add_stage(ResponseStage)
            .add_edge(StageId::Start, StageId::Normalize)
            .add_edge(StageId::Normalize, StageId::SafeguardClassify)
            .add_edge(StageId::SafeguardClassify, StageId::SafeguardDecision)
            .add_conditional_edge(
                StageId::SafeguardDecision,
                route_after_safeguard,
                SAFEGUARD_TARGETS,
            )
            .add_edge(StageId::SafeguardFail, StageId::Response)
            .add_edge(StageId::Translate, StageId::QualityCheck)
            .add_edge(StageId::QualityCheck, StageId::RetryGate)
            .add_conditional_edge(
                StageId::RetryGate,
                route_after_retry_gate,
                RETRY_GATE_TARGETS,
            )
            .add_edge(StageId::RetryTranslate, StageId::QualityCheck)
            .add_edge(StageId::Response, StageId::End)
            .with_max_steps(settings.max_steps)
            .with_retry_allowance(RetryAllowance::STANDARD)
            .compile()
    }

    /// Configured step ceiling
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Step ceiling of a run over `state`
    ///
    /// Never below what the state's retry budget needs when the graph has a
    /// retry allowance.
    pub fn step_limit(&self, state: &TranslationState) -> usize {
        match self.retry_allowance {
            Some(allowance) => self
                .max_steps
                .max(allowance.required_steps(state.effective_max_retry_count())),
            None => self.max_steps,
        }
    }

    /// Stage that follows `from` for the given state
    pub fn next_stage(&self, from: StageId, state: &TranslationState) -> Result<StageId, WorkflowError> {
        match self.edges.get(&from) {
            Some(Edge::Fixed(to)) => Ok(*to),
            Some(Edge::Conditional { router, .. }) => Ok(router(state)),
            None => Err(WorkflowError::MissingEdge(from)),
        }
    }

    /// Execute one run from `Start` to `End`
    ///
    /// Exactly one stage executes at a time. The run fails on the first
    /// stage error or once more than [`step_limit`](Self::step_limit) stages
    /// have executed.
    pub async fn run(&self, mut state: TranslationState) -> Result<TranslationState, WorkflowError> {
        let run_id = Uuid::new_v4();
        info!("[{}] Workflow started ({} chars)", run_id, state.text.chars().count());

        let limit = self.step_limit(&state);
        let mut current = self.next_stage(StageId::Start, &state)?;
        let mut steps = 0usize;

        while current != StageId::End {
            steps += 1;
            if steps > limit {
                error!("[{}] Step limit of {} exceeded at {}", run_id, limit, current);
                return Err(WorkflowError::StepLimitExceeded { limit });
            }

            let stage = self
                .stages
                .get(&current)
                .ok_or(WorkflowError::MissingStage(current))?;

            debug!("[{}] step {}: {}", run_id, steps, current);
            if let Err(e) = stage.apply(&mut state).await {
                error!("[{}] Stage {} failed: {}", run_id, current, e);
                return Err(e);
            }

            current = self.next_stage(current, &state)?;
        }

        info!(
            "[{}] Workflow finished in {} steps: status={}, retries={}",
            run_id,
            steps,
            state
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
            state.retry_count
        );

        Ok(state)
    }
}
