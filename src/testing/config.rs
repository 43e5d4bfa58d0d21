//! Case file configuration types
//!
//! Defines the data structures for deserializing YAML case files.

use serde::Deserialize;
use serde_json::Value;

/// A suite of cases loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct CaseFile {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite verifies
    pub description: Option<String>,
    /// The cases to run, in order
    pub cases: Vec<CaseSpec>,
}

/// A single invocation and its expected result
#[derive(Deserialize, Debug)]
pub struct CaseSpec {
    /// Optional label shown in the report (defaults to the method name)
    pub name: Option<String>,
    /// Operation to invoke
    pub method: String,
    /// Raw arguments: literals, JSON text, or data file names
    #[serde(default)]
    pub args: Vec<Value>,
    /// Expected result; omit to only check that the call succeeds
    pub expect: Option<Value>,
    /// Compare sequences without regard to order
    #[serde(default)]
    pub unordered: bool,
    /// Absolute numeric tolerance for this case
    pub tolerance: Option<f64>,
}

impl CaseSpec {
    /// Label for reports
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_case_file() {
        let yaml = r#"
name: arrays
cases:
  - method: sort
    args: [[3, 1, 2]]
    expect: "[1, 2, 3]"
  - name: subsets of two
    method: subsets
    args: ["cases/pair.json"]
    expect: [[], [1], [2], [1, 2]]
    unordered: true
    tolerance: 0.5
"#;
        let file: CaseFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.name, "arrays");
        assert!(file.description.is_none());
        assert_eq!(file.cases.len(), 2);

        let first = &file.cases[0];
        assert_eq!(first.label(), "sort");
        assert_eq!(first.args, vec![json!([3, 1, 2])]);
        assert_eq!(first.expect, Some(json!("[1, 2, 3]")));
        assert!(!first.unordered);

        let second = &file.cases[1];
        assert_eq!(second.label(), "subsets of two");
        assert!(second.unordered);
        assert_eq!(second.tolerance, Some(0.5));
        assert_eq!(second.expect, Some(json!([[], [1], [2], [1, 2]])));
    }
}
