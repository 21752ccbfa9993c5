//! Suite execution.
//!
//! [`run`] walks a [`TestPlan`] in suite order, drives the evaluator through its
//! lifecycle hooks and turns every [`Outcome`] into a report event. A failing or
//! panicking case is contained to that case: the loop always moves on to the
//! next one. Only a load error (before this module is reached) or a suite
//! setup error aborts the run.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::context::ExecutionContext;
use crate::diagnostics::{HarnessError, TeardownScope};
use crate::evaluator::{Evaluator, EvaluatorError, HookResult, Outcome};
use crate::identity::{TestIdentity, TestPlan};
use crate::report::{ReportSink, RunSummary};
use crate::suite::TestCase;

/// Runs every case of `plan` against `evaluator`, reporting to `sink`.
///
/// Returns [`HarnessError::SuiteSetup`] if suite setup fails, in which case no
/// case event has been emitted. Otherwise every case produces one started
/// event and exactly one pass, skip or fail event.
pub fn run<E, R>(plan: &TestPlan, evaluator: &E, sink: &mut R) -> Result<RunSummary, HarnessError>
where
    E: Evaluator + ?Sized,
    R: ReportSink + ?Sized,
{
    let mut context = ExecutionContext::create(evaluator);
    guarded(|| evaluator.before_suite(context.state_mut(), plan.suite(), plan.model_reference()))
        .map_err(|source| HarnessError::SuiteSetup {
            suite: plan.suite_name().to_string(),
            source,
        })?;
    context.suite_ready();
    sink.suite_started(plan.suite_name(), plan.len());

    let mut summary = RunSummary::new(plan.suite_name());
    let mut warnings = Vec::new();
    for (position, (case, identity)) in plan.iter().enumerate() {
        sink.test_started(identity);
        let mut scope = CaseScope::enter(evaluator, &mut context, position, case, identity, &mut warnings);
        let outcome = scope.evaluate();
        report(sink, identity, outcome, &mut summary);
        drop(scope);
    }

    if let Err(source) = guarded(|| evaluator.after_suite(context.state_mut(), plan.suite())) {
        warnings.push(HarnessError::Teardown {
            scope: TeardownScope::Suite(plan.suite_name().to_string()),
            source,
        });
    }
    summary.warnings = warnings;
    summary.elapsed = context.finish();
    sink.suite_finished(&summary);
    Ok(summary)
}

fn report<R>(sink: &mut R, identity: &TestIdentity, outcome: Outcome, summary: &mut RunSummary)
where
    R: ReportSink + ?Sized,
{
    match outcome {
        Outcome::Success => {
            summary.passed += 1;
            sink.test_passed(identity);
        }
        Outcome::Ignored => {
            summary.skipped += 1;
            sink.test_skipped(identity);
        }
        Outcome::Error(message) => {
            summary.failed += 1;
            sink.test_failed(identity, &message);
        }
    }
}

/// One active case. Dropping the scope runs the per-case teardown, so it
/// happens exactly once on every exit path.
struct CaseScope<'run, E: Evaluator + ?Sized> {
    evaluator: &'run E,
    context: &'run mut ExecutionContext<E::Context>,
    case: &'run TestCase,
    identity: &'run TestIdentity,
    warnings: &'run mut Vec<HarnessError>,
}

impl<'run, E: Evaluator + ?Sized> CaseScope<'run, E> {
    fn enter(
        evaluator: &'run E,
        context: &'run mut ExecutionContext<E::Context>,
        position: usize,
        case: &'run TestCase,
        identity: &'run TestIdentity,
        warnings: &'run mut Vec<HarnessError>,
    ) -> Self {
        context.enter_case(position);
        Self {
            evaluator,
            context,
            case,
            identity,
            warnings,
        }
    }

    /// Case setup followed by evaluation. Setup failures and panics are
    /// classified as case failures.
    fn evaluate(&mut self) -> Outcome {
        let evaluator = self.evaluator;
        let case = self.case;
        let state = self.context.state_mut();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            if let Err(e) = evaluator.before_case(state, case) {
                return Outcome::Error(format!("case setup failed: {e}"));
            }
            evaluator.evaluate(state, case)
        }));
        result.unwrap_or_else(|payload| {
            Outcome::Error(format!("evaluator panicked: {}", panic_message(payload.as_ref())))
        })
    }
}

impl<E: Evaluator + ?Sized> Drop for CaseScope<'_, E> {
    fn drop(&mut self) {
        let evaluator = self.evaluator;
        let case = self.case;
        let state = self.context.state_mut();
        if let Err(source) = guarded(|| evaluator.after_case(state, case)) {
            self.warnings.push(HarnessError::Teardown {
                scope: TeardownScope::Case(self.identity.clone()),
                source,
            });
        }
        self.context.leave_case();
    }
}

/// Runs a lifecycle hook, turning a panic into an [`EvaluatorError`].
fn guarded(hook: impl FnOnce() -> HookResult) -> HookResult {
    panic::catch_unwind(AssertUnwindSafe(hook)).unwrap_or_else(|payload| {
        Err(EvaluatorError::new(format!(
            "panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
