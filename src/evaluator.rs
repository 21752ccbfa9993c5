//! The evaluator contract.
//!
//! Each decision-engine vendor plugs into the harness by implementing
//! [`Evaluator`]. The harness never evaluates a model itself: it only calls the
//! lifecycle hooks in order and classifies the [`Outcome`] of [`Evaluator::evaluate`].
//!
//! Hook order for one run:
//!
//! ```text
//! create_context
//! before_suite
//!   (before_case, evaluate, after_case) * N   // suite order
//! after_suite
//! ```

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::suite::{ModelReference, Suite, TestCase};

/// Classification of a single case result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "message", rename_all = "lowercase")]
pub enum Outcome {
    Success,
    /// Deliberately excluded, e.g. an unsupported feature.
    Ignored,
    /// The case failed. The message is the human-readable cause.
    Error(String),
}

impl Outcome {
    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error(message.into())
    }
}

/// Failure of a lifecycle hook other than `evaluate`.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct EvaluatorError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl EvaluatorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, keeping it as the diagnostic cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for EvaluatorError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for EvaluatorError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Result type for lifecycle hooks.
pub type HookResult = Result<(), EvaluatorError>;

/// A pluggable decision-model evaluator.
///
/// `evaluate` must not panic to signal a failed case; it returns
/// [`Outcome::Error`] instead. Only the orchestrator calls it, exactly once per
/// case, in suite order.
pub trait Evaluator {
    /// Per-run state, created fresh for every run and dropped at its end.
    type Context;

    fn create_context(&self) -> Self::Context;

    /// One-time suite work such as loading and compiling the model. An error
    /// here aborts the run before any case starts.
    fn before_suite(
        &self,
        context: &mut Self::Context,
        suite: &Suite,
        model: &ModelReference,
    ) -> HookResult;

    fn before_case(&self, _context: &mut Self::Context, _case: &TestCase) -> HookResult {
        Ok(())
    }

    fn evaluate(&self, context: &mut Self::Context, case: &TestCase) -> Outcome;

    /// Runs after every case that started, whatever its outcome.
    fn after_case(&self, _context: &mut Self::Context, _case: &TestCase) -> HookResult {
        Ok(())
    }

    fn after_suite(&self, _context: &mut Self::Context, _suite: &Suite) -> HookResult {
        Ok(())
    }
}

/// Evaluator used when no vendor evaluator is configured: every case is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRun;

impl Evaluator for DryRun {
    type Context = ();

    fn create_context(&self) -> Self::Context {}

    fn before_suite(&self, _context: &mut (), _suite: &Suite, _model: &ModelReference) -> HookResult {
        Ok(())
    }

    fn evaluate(&self, _context: &mut (), _case: &TestCase) -> Outcome {
        Outcome::Ignored
    }
}
