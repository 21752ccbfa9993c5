//! Suite model and descriptor loading.
//!
//! A suite descriptor is a YAML or JSON document shaped like a TCK `testCases`
//! file:
//!
//! ```yaml
//! modelName: 0001-input-data-string.dmn
//! labels: [Compliance Level 2]
//! testCases:
//!   - id: "001"
//!     inputNodes:
//!       - name: Full Name
//!         value: John Doe
//!     resultNodes:
//!       - name: Greeting Message
//!         expected: Hello John Doe
//! ```
//!
//! The TCK's own XML `testCases` documents are read as well (see [`xml`]).
//! Input values and expected results are kept as opaque JSON trees. Only the
//! evaluator interprets them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use miette::{NamedSource, SourceSpan};

use crate::diagnostics::HarnessError;

pub mod xml;

/// File extensions accepted as suite descriptors.
pub const DESCRIPTOR_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "xml"];

/// An ordered corpus of test cases bound to one decision model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suite {
    /// Model file name, relative to the descriptor's directory.
    pub model_name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Cases in file order, which is also the execution order. The key is
    /// required so that a misspelled `testCases` is a load error.
    pub test_cases: Vec<TestCase>,
}

/// What a test case invokes inside the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseKind {
    #[default]
    Decision,
    Bkm,
    DecisionService,
}

/// One declarative input/expected-output record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: CaseKind,
    #[serde(default)]
    pub invocable_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_nodes: Vec<InputNode>,
    #[serde(default)]
    pub result_nodes: Vec<ResultNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InputNode {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultNode {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// The evaluator is expected to fail producing this result.
    #[serde(default)]
    pub error_result: bool,
    #[serde(default)]
    pub expected: serde_json::Value,
}

/// Absolute `file:` URL of the decision model a suite runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelReference(Url);

impl ModelReference {
    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Filesystem path of the model, if the URL is a local file.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        self.0.to_file_path().ok()
    }
}

impl std::fmt::Display for ModelReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Suite {
    /// Reads and deserializes a descriptor, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Suite, HarnessError> {
        let format = DescriptorFormat::of(path)?;
        let content = fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, format).map_err(|err| {
            let span = err.span(content.len());
            HarnessError::Parse {
                path: path.to_path_buf(),
                message: err.message,
                src: NamedSource::new(path.display().to_string(), content),
                span,
            }
        })
    }

    /// Deserializes descriptor text in the given format.
    pub fn parse(content: &str, format: DescriptorFormat) -> Result<Suite, DescriptorError> {
        match format {
            DescriptorFormat::Yaml => serde_yaml::from_str(content).map_err(|e| DescriptorError {
                offset: e.location().map(|location| location.index()),
                message: e.to_string(),
            }),
            DescriptorFormat::Json => serde_json::from_str(content).map_err(|e| DescriptorError {
                offset: offset_of(content, e.line(), e.column()),
                message: e.to_string(),
            }),
            DescriptorFormat::Xml => xml::parse(content),
        }
    }

    /// Resolves `model_name` against the descriptor's parent directory.
    ///
    /// The model always lives under the descriptor's directory: a rooted
    /// `model_name` is rejected rather than allowed to replace that directory.
    /// Relative results are anchored at the current working directory so the
    /// reference is always an absolute URL.
    pub fn model_reference(&self, descriptor: &Path) -> Result<ModelReference, HarnessError> {
        let unresolved = || HarnessError::ModelReference {
            descriptor: descriptor.to_path_buf(),
            model: self.model_name.clone(),
        };
        let model = Path::new(&self.model_name);
        if model.has_root() || model.is_absolute() {
            return Err(unresolved());
        }
        let joined = match descriptor.parent() {
            Some(parent) => parent.join(model),
            None => model.to_path_buf(),
        };
        let absolute = if joined.is_absolute() {
            joined
        } else {
            std::env::current_dir().map_err(|_| unresolved())?.join(joined)
        };
        Url::from_file_path(&absolute)
            .map(ModelReference)
            .map_err(|()| unresolved())
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }
}

/// A descriptor that could not be deserialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorError {
    pub message: String,
    /// Byte offset of the offending input, when the parser reports one.
    pub offset: Option<usize>,
}

impl DescriptorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
        }
    }

    /// Label span for the offset, clamped to a document of `len` bytes.
    pub fn span(&self, len: usize) -> Option<SourceSpan> {
        self.offset.map(|offset| {
            let start = offset.min(len);
            let width = usize::from(start < len);
            SourceSpan::from((start, width))
        })
    }
}

impl std::fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Byte offset of a 1-based line/column position. Line 0 means "no position".
fn offset_of(content: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some(line_start + column.saturating_sub(1))
}

/// Serialization format of a suite descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Yaml,
    Json,
    /// The TCK `testCases` XML schema.
    Xml,
}

impl DescriptorFormat {
    pub fn of(path: &Path) -> Result<DescriptorFormat, HarnessError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(DescriptorFormat::Yaml),
            Some("json") => Ok(DescriptorFormat::Json),
            Some("xml") => Ok(DescriptorFormat::Xml),
            _ => Err(HarnessError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// True if the path has one of the [`DESCRIPTOR_EXTENSIONS`].
pub fn is_descriptor(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| DESCRIPTOR_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
