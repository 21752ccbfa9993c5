//! Shared fixtures for the harness integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use dmn_tck_runner::suite::DescriptorFormat;
use dmn_tck_runner::{
    Evaluator, EvaluatorError, HookResult, ModelReference, Outcome, Suite, TestCase, TestPlan,
};

/// Builds a plan for `file_name` whose cases carry the given ids.
pub fn plan(file_name: &str, ids: &[&str]) -> TestPlan {
    TestPlan::build(Path::new(file_name), suite_yaml(ids)).unwrap()
}

pub fn suite_yaml(ids: &[&str]) -> Suite {
    let mut yaml = String::from("modelName: model.dmn\ntestCases:");
    if ids.is_empty() {
        yaml.push_str(" []");
    }
    yaml.push('\n');
    for id in ids {
        yaml.push_str(&format!("  - id: \"{id}\"\n"));
    }
    Suite::parse(&yaml, DescriptorFormat::Yaml).unwrap()
}

/// Per-run state of [`Scripted`].
#[derive(Debug)]
pub struct ScriptContext {
    pub run: usize,
    pub model: Option<ModelReference>,
}

/// Evaluator whose behaviour per case id is set up front and whose hook
/// calls are recorded in order.
#[derive(Default)]
pub struct Scripted {
    pub outcomes: HashMap<String, Outcome>,
    pub fail_suite_setup: Option<String>,
    pub fail_before_case: HashSet<String>,
    pub fail_after_case: HashSet<String>,
    pub panic_on: HashSet<String>,
    pub fail_after_suite: bool,
    pub calls: RefCell<Vec<String>>,
    pub runs: Cell<usize>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(mut self, id: &str, outcome: Outcome) -> Self {
        self.outcomes.insert(id.to_string(), outcome);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl Evaluator for Scripted {
    type Context = ScriptContext;

    fn create_context(&self) -> ScriptContext {
        self.runs.set(self.runs.get() + 1);
        self.record(format!("create_context#{}", self.runs.get()));
        ScriptContext {
            run: self.runs.get(),
            model: None,
        }
    }

    fn before_suite(
        &self,
        context: &mut ScriptContext,
        _suite: &Suite,
        model: &ModelReference,
    ) -> HookResult {
        self.record("before_suite".to_string());
        if let Some(message) = &self.fail_suite_setup {
            return Err(EvaluatorError::new(message.clone()));
        }
        context.model = Some(model.clone());
        Ok(())
    }

    fn before_case(&self, _context: &mut ScriptContext, case: &TestCase) -> HookResult {
        self.record(format!("before_case:{}", case.id));
        if self.fail_before_case.contains(&case.id) {
            return Err("fixture unavailable".into());
        }
        Ok(())
    }

    fn evaluate(&self, context: &mut ScriptContext, case: &TestCase) -> Outcome {
        self.record(format!("evaluate:{}@run{}", case.id, context.run));
        if self.panic_on.contains(&case.id) {
            panic!("boom");
        }
        self.outcomes
            .get(&case.id)
            .cloned()
            .unwrap_or(Outcome::Success)
    }

    fn after_case(&self, _context: &mut ScriptContext, case: &TestCase) -> HookResult {
        self.record(format!("after_case:{}", case.id));
        if self.fail_after_case.contains(&case.id) {
            return Err("leaked handle".into());
        }
        Ok(())
    }

    fn after_suite(&self, _context: &mut ScriptContext, _suite: &Suite) -> HookResult {
        self.record("after_suite".to_string());
        if self.fail_after_suite {
            return Err("runtime did not shut down".into());
        }
        Ok(())
    }
}
