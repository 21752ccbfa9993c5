//! Reader for the TCK `testCases` XML schema.
//!
//! ```xml
//! <testCases xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
//!   <modelName>0001-input-data-string.dmn</modelName>
//!   <labels><label>Compliance Level 2</label></labels>
//!   <testCase id="001">
//!     <inputNode name="Full Name">
//!       <value xsi:type="xsd:string">John Doe</value>
//!     </inputNode>
//!     <resultNode name="Greeting Message" type="decision">
//!       <expected><value xsi:type="xsd:string">Hello John Doe</value></expected>
//!     </resultNode>
//!   </testCase>
//! </testCases>
//! ```
//!
//! The document is deserialized into schema-shaped structs and then mapped
//! onto [`Suite`]. Typed values become JSON scalars, `component` elements
//! become objects, `list` elements become arrays and `xsi:nil` becomes null.

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use super::{CaseKind, DescriptorError, InputNode, ResultNode, Suite, TestCase};

#[derive(Debug, Deserialize)]
struct TestCasesDoc {
    #[serde(rename = "modelName")]
    model_name: String,
    #[serde(default)]
    labels: Option<LabelsDoc>,
    #[serde(rename = "testCase", default)]
    test_cases: Vec<TestCaseDoc>,
}

#[derive(Debug, Deserialize)]
struct LabelsDoc {
    #[serde(default)]
    label: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TestCaseDoc {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "@type", default)]
    kind: Option<String>,
    #[serde(rename = "@invocableName", default)]
    invocable_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "inputNode", default)]
    input_nodes: Vec<ValueTypeDoc>,
    #[serde(rename = "resultNode", default)]
    result_nodes: Vec<ResultNodeDoc>,
}

#[derive(Debug, Deserialize)]
struct ResultNodeDoc {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@type", default)]
    kind: Option<String>,
    #[serde(rename = "@errorResult", default)]
    error_result: Option<String>,
    #[serde(default)]
    expected: Option<ValueTypeDoc>,
}

/// The schema's `valueType`: one simple value, a set of named components,
/// or a list. Used for input nodes, components, list items and expectations.
#[derive(Debug, Default, Deserialize)]
struct ValueTypeDoc {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(default)]
    value: Option<SimpleValueDoc>,
    #[serde(default)]
    component: Vec<ValueTypeDoc>,
    #[serde(default)]
    list: Option<ListDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct ListDoc {
    #[serde(default)]
    item: Vec<ValueTypeDoc>,
}

#[derive(Debug, Deserialize)]
struct SimpleValueDoc {
    #[serde(rename = "@type", alias = "@xsi:type", default)]
    xsi_type: Option<String>,
    #[serde(rename = "@nil", alias = "@xsi:nil", default)]
    nil: Option<String>,
    #[serde(rename = "$text", default)]
    text: Option<String>,
}

/// Parses a TCK XML document into a [`Suite`].
pub fn parse(content: &str) -> Result<Suite, DescriptorError> {
    let doc: TestCasesDoc =
        quick_xml::de::from_str(content).map_err(|e| DescriptorError::new(e.to_string()))?;
    let test_cases = doc
        .test_cases
        .into_iter()
        .map(TestCaseDoc::into_case)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Suite {
        model_name: doc.model_name,
        labels: doc.labels.map(|labels| labels.label).unwrap_or_default(),
        test_cases,
    })
}

impl TestCaseDoc {
    fn into_case(self) -> Result<TestCase, DescriptorError> {
        let kind = match self.kind.as_deref() {
            None | Some("decision") => CaseKind::Decision,
            Some("bkm") => CaseKind::Bkm,
            Some("decisionService") => CaseKind::DecisionService,
            Some(other) => {
                return Err(DescriptorError::new(format!(
                    "test case '{}' has unknown type '{other}'",
                    self.id
                )))
            }
        };
        let input_nodes = self
            .input_nodes
            .into_iter()
            .map(|node| -> Result<InputNode, DescriptorError> {
                let name = node.name.clone().ok_or_else(|| {
                    DescriptorError::new(format!("test case '{}' has an unnamed inputNode", self.id))
                })?;
                Ok(InputNode {
                    name,
                    value: node.to_json(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let result_nodes = self
            .result_nodes
            .into_iter()
            .map(|node| ResultNode {
                name: node.name,
                kind: node.kind,
                error_result: node.error_result.as_deref() == Some("true"),
                expected: node.expected.map(|v| v.to_json()).unwrap_or(Value::Null),
            })
            .collect();
        Ok(TestCase {
            id: self.id,
            name: self.name,
            kind,
            invocable_name: self.invocable_name,
            description: self.description,
            input_nodes,
            result_nodes,
        })
    }
}

impl ValueTypeDoc {
    fn to_json(&self) -> Value {
        if let Some(list) = &self.list {
            return Value::Array(list.item.iter().map(ValueTypeDoc::to_json).collect());
        }
        if !self.component.is_empty() {
            let mut object = Map::new();
            for component in &self.component {
                let key = component.name.clone().unwrap_or_default();
                object.insert(key, component.to_json());
            }
            return Value::Object(object);
        }
        self.value.as_ref().map(SimpleValueDoc::to_json).unwrap_or(Value::Null)
    }
}

impl SimpleValueDoc {
    fn to_json(&self) -> Value {
        if self.nil.as_deref() == Some("true") {
            return Value::Null;
        }
        let text = self.text.clone().unwrap_or_default();
        let xsd_type = self
            .xsi_type
            .as_deref()
            .map(|t| t.rsplit(':').next().unwrap_or(t));
        match xsd_type {
            Some("decimal" | "double" | "float" | "integer" | "int" | "long") => {
                number(text.trim()).unwrap_or(Value::String(text))
            }
            Some("boolean") => match text.trim() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(text.clone()),
            },
            _ => Value::String(text),
        }
    }
}

fn number(text: &str) -> Option<Value> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
