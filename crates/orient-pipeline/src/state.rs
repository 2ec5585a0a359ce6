//! Request state machine.
//!
//! `Received → Augmented → Translated → Retrieved(primary) →
//! Retrieved(secondary) → Answered → TranslatedFinal → Done`, with `Failed`
//! reachable from any non-terminal state. Presentation operations walk a
//! subset of the path.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use orient_chain::{StageError, StageKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Received,
    Augmented,
    Translated,
    Retrieved { corpus: String, chunks: usize, ranked: usize },
    Answered { degraded: bool },
    TranslatedFinal { language: String, degraded: bool },
    Done,
    Failed { stage: StageKind, cause: String },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool { matches!(self, Self::Done | Self::Failed { .. }) }
}

/// The states one request went through, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trace(Vec<PipelineState>);

impl Trace {
    pub fn start() -> Self {
        let mut trace = Self::default();
        trace.advance(PipelineState::Received);
        trace
    }

    pub fn advance(&mut self, state: PipelineState) {
        info!(?state, "pipeline state");
        debug_assert!(self.0.last().map_or(true, |s| !s.is_terminal()), "advance after terminal state");
        self.0.push(state);
    }

    /// Record the failure and turn it into the error returned to the caller.
    pub fn fail(&mut self, source: StageError) -> PipelineError {
        let stage = source.stage();
        self.advance(PipelineState::Failed { stage, cause: source.to_string() });
        PipelineError { stage, source, trace: self.clone() }
    }

    pub fn states(&self) -> &[PipelineState] { &self.0 }

    pub fn last(&self) -> Option<&PipelineState> { self.0.last() }
}

/// Terminal `Failed(stage, cause)`.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct PipelineError {
    pub stage: StageKind,
    pub source: StageError,
    pub trace: Trace,
}
