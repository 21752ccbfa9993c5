//! Per-run execution context.
//!
//! [`ExecutionContext`] owns the evaluator-defined state for exactly one run
//! and records how far the run has progressed through its lifecycle. It is
//! created by the orchestrator, lent to each hook as `&mut`, and consumed when
//! the run finishes, so state can never leak into another run.

use std::time::{Duration, Instant};

use crate::evaluator::Evaluator;

/// Lifecycle position of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Context exists, suite setup has not succeeded yet.
    Created,
    /// Suite setup succeeded, no case is active.
    Ready,
    /// The case at this plan position is between `before_case` and `after_case`.
    InCase(usize),
}

pub struct ExecutionContext<C> {
    state: C,
    phase: RunPhase,
    completed_cases: usize,
    started: Instant,
}

impl<C> ExecutionContext<C> {
    /// Creates fresh state through the evaluator's context factory.
    pub fn create<E>(evaluator: &E) -> Self
    where
        E: Evaluator<Context = C> + ?Sized,
    {
        Self {
            state: evaluator.create_context(),
            phase: RunPhase::Created,
            completed_cases: 0,
            started: Instant::now(),
        }
    }

    pub fn state_mut(&mut self) -> &mut C {
        &mut self.state
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn completed_cases(&self) -> usize {
        self.completed_cases
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn suite_ready(&mut self) {
        debug_assert_eq!(self.phase, RunPhase::Created);
        self.phase = RunPhase::Ready;
    }

    pub(crate) fn enter_case(&mut self, position: usize) {
        debug_assert_eq!(self.phase, RunPhase::Ready);
        self.phase = RunPhase::InCase(position);
    }

    pub(crate) fn leave_case(&mut self) {
        debug_assert!(matches!(self.phase, RunPhase::InCase(_)));
        self.completed_cases += 1;
        self.phase = RunPhase::Ready;
    }

    /// Ends the run, dropping the evaluator state. Returns the run duration.
    pub(crate) fn finish(self) -> Duration {
        self.elapsed()
    }
}

impl<C> std::fmt::Debug for ExecutionContext<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("phase", &self.phase)
            .field("completed_cases", &self.completed_cases)
            .finish_non_exhaustive()
    }
}
