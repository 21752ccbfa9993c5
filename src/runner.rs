//! Multi-suite runs over a TCK directory tree.
//!
//! A TCK checkout holds one descriptor per suite, usually next to its model
//! file. [`TckRunner`] discovers the descriptors under a root, then loads,
//! plans and runs each one in path order. A descriptor that fails to load, or
//! whose suite setup fails, is recorded and the runner moves on to the next
//! descriptor; inside a suite the orchestrator's rules apply unchanged.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::HarnessError;
use crate::evaluator::Evaluator;
use crate::identity::{suite_name_for, TestPlan};
use crate::orchestrator;
use crate::report::{ReportSink, RunSummary};
use crate::suite::is_descriptor;

/// Configuration for a harness run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// A descriptor file or a directory to scan for descriptors.
    pub root: PathBuf,
    /// Only run suites whose name contains this substring.
    pub filter: Option<String>,
    pub use_colors: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("TestCases"),
            filter: None,
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl RunnerConfig {
    /// True if a suite with this name passes the configured filter.
    pub fn selects(&self, suite_name: &str) -> bool {
        match &self.filter {
            Some(filter) => suite_name
                .to_lowercase()
                .contains(&filter.to_lowercase()),
            None => true,
        }
    }
}

/// Aggregated results of a multi-suite run.
#[derive(Debug, Default)]
pub struct Totals {
    pub suites: Vec<RunSummary>,
    /// Load and suite-setup errors, one per aborted suite.
    pub errors: Vec<HarnessError>,
}

impl Totals {
    pub fn passed(&self) -> usize {
        self.suites.iter().map(|s| s.passed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.suites.iter().map(|s| s.skipped).sum()
    }

    pub fn failed(&self) -> usize {
        self.suites.iter().map(|s| s.failed).sum()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &HarnessError> + '_ {
        self.suites.iter().flat_map(|s| s.warnings.iter())
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.errors.is_empty()
    }

    /// Process exit status: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Finds suite descriptors under `root`, sorted for a deterministic order.
///
/// A `root` that is itself a file is returned as the only descriptor, whatever
/// its extension, so that loading reports an unsupported format explicitly.
pub fn discover_descriptors(root: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| HarnessError::Discovery {
            root: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && is_descriptor(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Runs every selected descriptor under a root against one evaluator.
pub struct TckRunner {
    config: RunnerConfig,
}

impl TckRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Descriptors under the configured root that pass the filter.
    pub fn descriptors(&self) -> Result<Vec<PathBuf>, HarnessError> {
        let all = discover_descriptors(&self.config.root)?;
        Ok(all
            .into_iter()
            .filter(|path| self.config.selects(&suite_name_for(path)))
            .collect())
    }

    /// Loads and indexes every selected descriptor without running anything.
    ///
    /// Each entry is either a plan or the load error for that descriptor.
    pub fn plans(&self) -> Result<Vec<Result<TestPlan, HarnessError>>, HarnessError> {
        Ok(self
            .descriptors()?
            .iter()
            .map(|path| TestPlan::load(path))
            .collect())
    }

    pub fn run_all<E, R>(&self, evaluator: &E, sink: &mut R) -> Result<Totals, HarnessError>
    where
        E: Evaluator + ?Sized,
        R: ReportSink + ?Sized,
    {
        let mut totals = Totals::default();
        for plan in self.plans()? {
            let outcome = plan.and_then(|plan| orchestrator::run(&plan, evaluator, sink));
            match outcome {
                Ok(summary) => totals.suites.push(summary),
                Err(err) => totals.errors.push(err),
            }
        }
        Ok(totals)
    }
}
