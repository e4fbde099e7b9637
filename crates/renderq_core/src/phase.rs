use std::fmt;

/// Lifecycle of a single render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Created,
    Parsing,
    WaitReady,
    Rendering,
    Done,
    Skipped,
    Aborted,
    Failed,
    CleanedUp,
}

/// Inputs that move a job between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    /// Scene handed to the engine for asynchronous parsing.
    SubmitParse,
    /// Orchestrator starts polling for scene readiness.
    AwaitScene,
    /// Engine reports the scene as ready.
    SceneReady,
    /// One of the termination flags was observed.
    RenderComplete,
    Skip,
    Abort,
    /// An engine call failed.
    Fail,
    /// Context exited, waited, cleaned up and released.
    TearDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: JobPhase,
    pub event: JobEvent,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid job transition {:?} on {:?}", self.from, self.event)
    }
}

impl std::error::Error for TransitionError {}

impl JobPhase {
    /// Pure transition function for the job state machine.
    pub fn apply(self, event: JobEvent) -> Result<JobPhase, TransitionError> {
        use JobEvent as E;
        use JobPhase as P;

        let next = match (self, event) {
            (P::Created, E::SubmitParse) => P::Parsing,
            (P::Parsing, E::AwaitScene) => P::WaitReady,
            (P::WaitReady, E::SceneReady) => P::Rendering,
            (P::Rendering, E::RenderComplete) => P::Done,
            (phase, E::Skip) if phase.is_active() => P::Skipped,
            (phase, E::Abort) if phase.is_active() => P::Aborted,
            (phase, E::Fail) if phase.is_active() => P::Failed,
            // Teardown also runs on unwinding paths that never reached an outcome.
            (phase, E::TearDown) if phase != P::CleanedUp => P::CleanedUp,
            (from, event) => return Err(TransitionError { from, event }),
        };
        Ok(next)
    }

    /// True while the job owns a live context and has not reached an outcome.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            JobPhase::Created | JobPhase::Parsing | JobPhase::WaitReady | JobPhase::Rendering
        )
    }

    pub fn is_outcome(self) -> bool {
        matches!(
            self,
            JobPhase::Done | JobPhase::Skipped | JobPhase::Aborted | JobPhase::Failed
        )
    }
}
