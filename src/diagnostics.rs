//! Unified, `miette`-based diagnostics for the TCK harness.
//!
//! Every failure the harness itself can observe is a [`HarnessError`]. Case-level
//! evaluation failures are NOT errors here: the evaluator classifies them as an
//! [`Outcome`](crate::evaluator::Outcome) and the orchestrator turns that into a
//! failure report event.
//!
//! # Taxonomy
//!
//! - **Load** ([`HarnessError::Io`], [`HarnessError::Parse`],
//!   [`HarnessError::UnsupportedFormat`], [`HarnessError::ModelReference`]):
//!   fatal, raised before any test identity exists.
//! - **Suite setup** ([`HarnessError::SuiteSetup`]): fatal, no case events are emitted.
//! - **Teardown** ([`HarnessError::Teardown`]): best-effort, collected as warnings
//!   and never allowed to change a case classification.
//! - **Report output** ([`HarnessError::Report`]): a sink could not write; the run fails.
//! - **Plan lookup** ([`HarnessError::UnknownCase`]): a case that was never indexed.

use std::path::PathBuf;

use std::io::{self, Write};

use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

use crate::evaluator::EvaluatorError;
use crate::identity::TestIdentity;

/// Where a teardown hook failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownScope {
    /// Per-case teardown for the given case.
    Case(TestIdentity),
    /// Suite teardown for the named suite.
    Suite(String),
}

impl std::fmt::Display for TeardownScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeardownScope::Case(identity) => write!(f, "case {}", identity),
            TeardownScope::Suite(name) => write!(f, "suite {}", name),
        }
    }
}

/// Error type for all harness-level failure modes.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("failed to read suite descriptor '{}'", .path.display())]
    #[diagnostic(code(tck::load::io), help("check that the descriptor path exists and is readable"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed suite descriptor '{}': {message}", .path.display())]
    #[diagnostic(
        code(tck::load::parse),
        help("a descriptor needs a `modelName` and a `testCases` list whose entries carry an `id`")
    )]
    Parse {
        path: PathBuf,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("unsupported suite descriptor format '{}'", .path.display())]
    #[diagnostic(code(tck::load::format), help("use a .xml, .yaml, .yml or .json descriptor"))]
    UnsupportedFormat { path: PathBuf },

    #[error("cannot resolve model '{model}' relative to '{}'", .descriptor.display())]
    #[diagnostic(
        code(tck::load::model),
        help("`modelName` must be a relative path inside the descriptor's directory")
    )]
    ModelReference { descriptor: PathBuf, model: String },

    #[error("failed to walk '{}': {message}", .root.display())]
    #[diagnostic(code(tck::discovery))]
    Discovery { root: PathBuf, message: String },

    #[error("suite setup failed for '{suite}'")]
    #[diagnostic(code(tck::suite_setup))]
    SuiteSetup {
        suite: String,
        #[source]
        source: EvaluatorError,
    },

    #[error("teardown failed for {scope}")]
    #[diagnostic(code(tck::teardown), severity(Warning))]
    Teardown {
        scope: TeardownScope,
        #[source]
        source: EvaluatorError,
    },

    #[error("failed to write report output")]
    #[diagnostic(code(tck::report))]
    Report {
        #[source]
        source: io::Error,
    },

    #[error("test case '{case_id}' is not part of suite '{suite}'")]
    #[diagnostic(code(tck::unknown_case))]
    UnknownCase { suite: String, case_id: String },
}

impl HarnessError {
    /// True for the load-stage variants, which are raised before a plan exists.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            HarnessError::Io { .. }
                | HarnessError::Parse { .. }
                | HarnessError::UnsupportedFormat { .. }
                | HarnessError::ModelReference { .. }
        )
    }
}

/// Prints a harness error with full miette diagnostics.
pub fn print_error(error: HarnessError) {
    let _ = write_error(&mut io::stderr(), error);
}

/// Renders a harness error with full miette diagnostics.
pub fn write_error(out: &mut impl Write, error: HarnessError) -> io::Result<()> {
    let report = Report::new(error);
    writeln!(out, "{report:?}")
}
