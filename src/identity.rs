//! Test identities and the immutable test plan.
//!
//! A [`TestPlan`] owns a loaded [`Suite`] and assigns every test case a
//! [`TestIdentity`] exactly once. Slots are kept per case *object*, not per id
//! string, so a descriptor with accidental duplicate ids still yields one
//! identity per case. The plan is never mutated after [`TestPlan::build`], so
//! it can be shared with readers on other threads without locking.

use std::path::Path;

use serde::Serialize;

use crate::diagnostics::HarnessError;
use crate::suite::{ModelReference, Suite, TestCase};

/// Stable report key for one test case: `{suite_name}/{case_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TestIdentity {
    pub suite_name: String,
    pub case_id: String,
}

impl TestIdentity {
    pub fn new(suite_name: impl Into<String>, case_id: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            case_id: case_id.into(),
        }
    }
}

impl std::fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.suite_name, self.case_id)
    }
}

/// Derives a suite name from a descriptor path.
///
/// Only the file name is used. The final extension is stripped and every
/// remaining `.` becomes a `/`, so `a.b.TestSuite.xml` names suite
/// `a/b/TestSuite`.
pub fn suite_name_for(descriptor: &Path) -> String {
    let file_name = descriptor
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name.as_str(),
    };
    stem.replace('.', "/")
}

/// The addressable, ordered plan for one suite.
#[derive(Debug)]
pub struct TestPlan {
    suite_name: String,
    model_reference: ModelReference,
    suite: Suite,
    identities: Vec<TestIdentity>,
}

impl TestPlan {
    /// Indexes `suite`, naming it after `descriptor` and resolving its model
    /// relative to the descriptor's directory.
    pub fn build(descriptor: &Path, suite: Suite) -> Result<TestPlan, HarnessError> {
        let suite_name = suite_name_for(descriptor);
        let model_reference = suite.model_reference(descriptor)?;
        let identities = suite
            .test_cases
            .iter()
            .map(|case| TestIdentity::new(suite_name.clone(), case.id.clone()))
            .collect();
        Ok(TestPlan {
            suite_name,
            model_reference,
            suite,
            identities,
        })
    }

    /// Loads the descriptor at `path` and indexes it.
    pub fn load(path: &Path) -> Result<TestPlan, HarnessError> {
        let suite = Suite::load(path)?;
        Self::build(path, suite)
    }

    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    pub fn suite(&self) -> &Suite {
        &self.suite
    }

    pub fn model_reference(&self) -> &ModelReference {
        &self.model_reference
    }

    /// Every case in suite order. Stable across calls.
    pub fn all_cases(&self) -> &[TestCase] {
        &self.suite.test_cases
    }

    /// Identity of a case borrowed from this plan.
    ///
    /// Lookup is by reference identity: an equal case that lives elsewhere is
    /// reported as [`HarnessError::UnknownCase`]. The slot is computed from
    /// the case's address within the plan's case slice, so lookup is O(1).
    pub fn identity_of(&self, case: &TestCase) -> Result<&TestIdentity, HarnessError> {
        let cases = self.all_cases();
        let stride = std::mem::size_of::<TestCase>();
        let base = cases.as_ptr() as usize;
        let address = case as *const TestCase as usize;
        address
            .checked_sub(base)
            .filter(|offset| offset % stride == 0)
            .map(|offset| offset / stride)
            .filter(|&slot| slot < cases.len() && std::ptr::eq(&cases[slot], case))
            .map(|slot| &self.identities[slot])
            .ok_or_else(|| HarnessError::UnknownCase {
                suite: self.suite_name.clone(),
                case_id: case.id.clone(),
            })
    }

    /// Cases paired with their identities, in suite order.
    pub fn iter(&self) -> impl Iterator<Item = (&TestCase, &TestIdentity)> + '_ {
        self.all_cases().iter().zip(self.identities.iter())
    }

    pub fn identities(&self) -> &[TestIdentity] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
