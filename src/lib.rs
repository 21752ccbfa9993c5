//! Conformance-test harness for decision-model evaluators.
//!
//! A suite descriptor is loaded into a [`Suite`], indexed into a [`TestPlan`]
//! that gives every case a stable [`TestIdentity`], and run case by case
//! against a vendor [`Evaluator`] by [`orchestrator::run`]. Outcomes are
//! reported to any [`ReportSink`].

pub use crate::diagnostics::HarnessError;
pub use crate::evaluator::{DryRun, Evaluator, EvaluatorError, HookResult, Outcome};
pub use crate::identity::{suite_name_for, TestIdentity, TestPlan};
pub use crate::report::{ReportEvent, ReportSink, RunSummary};
pub use crate::suite::{ModelReference, Suite, TestCase};

pub mod cli;
pub mod context;
pub mod diagnostics;
pub mod evaluator;
pub mod identity;
pub mod orchestrator;
pub mod report;
pub mod runner;
pub mod suite;
