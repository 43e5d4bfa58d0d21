//! Argument materialization
//!
//! Turns loosely-typed test inputs into values of a required [`Shape`]. A raw
//! value that already has the shape passes through untouched. Anything else
//! is taken as text, which may name a data file under the project root:
//!
//! - structured files (`.json`) are read whole and parsed as JSON
//! - line files (`.txt`) are read one element per line into an array
//!
//! Text that names no existing file is parsed as an inline JSON literal.

use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};

use crate::common::config::FilesConfig;
use crate::common::{Error, Result};
use crate::shape::Shape;

/// Reason a value could not be brought into a shape
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct Mismatch(String);

impl Mismatch {
    fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    fn at(self, location: impl std::fmt::Display) -> Self {
        Self(format!("{}: {}", location, self.0))
    }
}

type Coerced = std::result::Result<Value, Mismatch>;

/// Converts raw arguments into shaped values, resolving data files
/// relative to a fixed project root
#[derive(Debug, Clone)]
pub struct Materializer {
    root: PathBuf,
    files: FilesConfig,
}

impl Materializer {
    /// Create a materializer resolving data files under `root`
    pub fn new(root: impl Into<PathBuf>, files: FilesConfig) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    /// Project root data files are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Materialize the argument at position `index` for a parameter of `shape`
    pub fn argument(&self, index: usize, raw: &Value, shape: &Shape) -> Result<Value> {
        self.materialize(raw, shape)
            .map_err(|e| Error::bad_argument(index, shape, e))
    }

    /// Materialize an expected value to compare against a result of `shape`
    ///
    /// The result is never text, so expected text is always read as a
    /// literal or data file name, even where `shape` would admit a string.
    pub fn expected(&self, raw: &Value, shape: &Shape) -> Result<Value> {
        let coerced = match raw {
            Value::String(text) => self.from_text(text, shape),
            other => self.materialize(other, shape),
        };
        coerced.map_err(|e| Error::bad_expected(shape, e))
    }

    /// Bring `raw` into `shape`
    pub fn materialize(&self, raw: &Value, shape: &Shape) -> Coerced {
        if shape.admits(raw) {
            return Ok(raw.clone());
        }

        match raw {
            Value::String(text) => self.from_text(text, shape),
            other => self.from_text(&other.to_string(), shape),
        }
    }

    /// Read `text` as a data file name or an inline literal
    fn from_text(&self, text: &str, shape: &Shape) -> Coerced {
        if let Some(path) = self.data_file(text, &self.files.structured_suffixes) {
            tracing::debug!(path = %path.display(), %shape, "Reading structured data file");
            let content = read_file(&path)?;
            return deserialize(&content, shape).map_err(|e| e.at(path.display()));
        }

        if let Some(path) = self.data_file(text, &self.files.line_suffixes) {
            tracing::debug!(path = %path.display(), %shape, "Reading line data file");
            let content = read_file(&path)?;
            return from_lines(&content, shape).map_err(|e| e.at(path.display()));
        }

        deserialize(text, shape)
    }

    /// Existing data file named by `text`, if it carries one of `suffixes`
    fn data_file(&self, text: &str, suffixes: &[String]) -> Option<PathBuf> {
        let lower = text.to_lowercase();
        if !suffixes.iter().any(|s| lower.ends_with(&s.to_lowercase())) {
            return None;
        }

        let path = self.root.join(text);
        if path.is_file() {
            Some(path)
        } else {
            tracing::debug!(path = %path.display(), "No such data file, treating as literal");
            None
        }
    }
}

fn read_file(path: &Path) -> std::result::Result<String, Mismatch> {
    std::fs::read_to_string(path)
        .map_err(|e| Mismatch::new(format!("failed to read '{}': {}", path.display(), e)))
}

/// Parse `text` as JSON and bring it into `shape`
pub fn deserialize(text: &str, shape: &Shape) -> Coerced {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Mismatch::new(format!("invalid JSON {:?}: {}", truncate(text), e)))?;
    conform(value, shape)
}

/// One array element per line; other targets take the whole content
///
/// Lines for `any` elements are kept as plain text.
fn from_lines(content: &str, shape: &Shape) -> Coerced {
    let element = match shape {
        Shape::Optional(inner) => inner.element(),
        other => other.element(),
    };
    let Some(element) = element else {
        return deserialize(content, shape);
    };

    content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let converted = match element {
                Shape::Any => Ok(Value::String(line.to_string())),
                scalar if scalar.is_scalar() => conform(Value::String(line.to_string()), scalar),
                nested => deserialize(line, nested),
            };
            converted.map_err(|e| e.at(format!("line {}", i + 1)))
        })
        .collect::<std::result::Result<Vec<_>, Mismatch>>()
        .map(Value::Array)
}

/// Convert an already-parsed value into `shape`
///
/// Conversions are lenient in the usual JSON-binding way: numeric strings
/// become numbers, numbers and bools become text, integral floats become
/// integers. `null` only fits optional shapes.
pub fn conform(value: Value, shape: &Shape) -> Coerced {
    tracing::trace!(%shape, %value, "Conforming value");

    match (shape, value) {
        (Shape::Any, v) => Ok(v),
        (Shape::Optional(_), Value::Null) => Ok(Value::Null),
        (Shape::Optional(inner), v) => conform(v, inner),
        (shape, Value::Null) => Err(Mismatch::new(format!("null is not a {}", shape))),

        (Shape::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (Shape::Bool, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Mismatch::new(format!("{:?} is not a bool", s))),
        },

        (Shape::Int, Value::Number(n)) => integral(&n)
            .ok_or_else(|| Mismatch::new(format!("{} is not an integer", n))),
        (Shape::Int, Value::String(s)) => parse_int(s.trim())
            .ok_or_else(|| Mismatch::new(format!("{:?} is not an integer", s))),

        (Shape::Float, Value::Number(n)) => Ok(Value::Number(n)),
        (Shape::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| Mismatch::new(format!("{:?} is not a finite number", s))),

        (Shape::Str, Value::String(s)) => Ok(Value::String(s)),
        (Shape::Str, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (Shape::Str, Value::Bool(b)) => Ok(Value::String(b.to_string())),

        (Shape::Char, Value::String(s)) if s.chars().count() == 1 => Ok(Value::String(s)),
        (Shape::Char, Value::Number(n)) if n.as_u64().map(|d| d < 10).unwrap_or(false) => {
            Ok(Value::String(n.to_string()))
        }

        (Shape::Array(element), Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| conform(item, element).map_err(|e| e.at(format!("[{}]", i))))
            .collect::<std::result::Result<Vec<_>, Mismatch>>()
            .map(Value::Array),

        (Shape::Map(inner), Value::Object(map)) => map
            .into_iter()
            .map(|(k, v)| {
                let v = conform(v, inner).map_err(|e| e.at(format!(".{}", k)))?;
                Ok((k, v))
            })
            .collect::<std::result::Result<Map<_, _>, Mismatch>>()
            .map(Value::Object),

        (Shape::Object(fields), Value::Object(mut map)) => {
            let mut out = Map::new();
            for (name, field) in fields {
                let v = match map.remove(name) {
                    Some(v) => conform(v, field).map_err(|e| e.at(format!(".{}", name)))?,
                    None if matches!(field, Shape::Optional(_)) => Value::Null,
                    None => return Err(Mismatch::new(format!("missing field '{}'", name))),
                };
                out.insert(name.clone(), v);
            }
            Ok(Value::Object(out))
        }

        (shape, v) => Err(Mismatch::new(format!("{} is not a {}", truncate(&v.to_string()), shape))),
    }
}

fn integral(n: &Number) -> Option<Value> {
    if n.is_i64() || n.is_u64() {
        return Some(Value::Number(n.clone()));
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

fn parse_int(s: &str) -> Option<Value> {
    s.parse::<i64>()
        .map(Value::from)
        .or_else(|_| s.parse::<u64>().map(Value::from))
        .ok()
}

fn truncate(s: &str) -> String {
    const LIMIT: usize = 60;
    if s.chars().count() > LIMIT {
        format!("{}...", s.chars().take(LIMIT).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn materializer(root: &Path) -> Materializer {
        Materializer::new(root, FilesConfig::default())
    }

    #[test]
    fn test_matching_shape_passes_through() {
        let m = materializer(Path::new("."));
        for (raw, shape) in [
            (json!(7), Shape::Int),
            (json!(2.5), Shape::Float),
            (json!("text"), Shape::Str),
            (json!(true), Shape::Bool),
            (json!([1, 2]), Shape::array(Shape::Int)),
        ] {
            assert_eq!(m.materialize(&raw, &shape).unwrap(), raw);
        }
    }

    #[test]
    fn test_serialized_text_round_trips() {
        let m = materializer(Path::new("."));
        for value in [json!(-3), json!(0.25), json!(false), json!([[1], [2, 3]]), json!({"k": 1})] {
            let shape = Shape::of(&value);
            assert_eq!(m.materialize(&value, &shape).unwrap(), value);
            let text = Value::String(value.to_string());
            assert_eq!(m.materialize(&text, &shape).unwrap(), value, "{text}");
        }
    }

    #[test]
    fn test_inline_literals() {
        let m = materializer(Path::new("."));
        assert_eq!(m.materialize(&json!("42"), &Shape::Int).unwrap(), json!(42));
        assert_eq!(
            m.materialize(&json!("[[1,2],[3]]"), &Shape::array(Shape::array(Shape::Int)))
                .unwrap(),
            json!([[1, 2], [3]])
        );
        assert_eq!(m.materialize(&json!(5), &Shape::Str).unwrap(), json!("5"));
    }

    #[test]
    fn test_invalid_literal_is_mismatch() {
        let m = materializer(Path::new("."));
        let err = m.materialize(&json!("[1,"), &Shape::array(Shape::Int)).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_argument_error_carries_index_and_shape() {
        let m = materializer(Path::new("."));
        let err = m.argument(2, &json!("abc"), &Shape::Int).unwrap_err();
        match err {
            Error::BadArgument { index, shape, .. } => {
                assert_eq!(index, 2);
                assert_eq!(shape, Shape::Int);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_line_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("cases")).unwrap();
        std::fs::write(tmp.path().join("cases/nums.TXT"), "10\n20\r\n30\n").unwrap();

        let m = materializer(tmp.path());
        let value = m
            .materialize(&json!("cases/nums.TXT"), &Shape::array(Shape::Int))
            .unwrap();
        assert_eq!(value, json!([10, 20, 30]));

        let words = m
            .materialize(&json!("cases/nums.TXT"), &Shape::array(Shape::Str))
            .unwrap();
        assert_eq!(words, json!(["10", "20", "30"]));
    }

    #[test]
    fn test_line_file_with_nested_elements() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("grid.txt"), "[1,2]\n[3]\n").unwrap();

        let m = materializer(tmp.path());
        let value = m
            .materialize(&json!("grid.txt"), &Shape::array(Shape::array(Shape::Int)))
            .unwrap();
        assert_eq!(value, json!([[1, 2], [3]]));
    }

    #[test]
    fn test_line_file_for_optional_array() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("nums.txt"), "1\n2\n").unwrap();

        let m = materializer(tmp.path());
        let value = m
            .materialize(&json!("nums.txt"), &Shape::optional(Shape::array(Shape::Int)))
            .unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn test_line_file_with_untyped_elements_keeps_text() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("mixed.txt"), "42\nhello world\n[1]\n").unwrap();

        let m = materializer(tmp.path());
        let value = m
            .materialize(&json!("mixed.txt"), &Shape::array(Shape::Any))
            .unwrap();
        assert_eq!(value, json!(["42", "hello world", "[1]"]));
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("nums.txt"), "1\ntwo\n").unwrap();

        let m = materializer(tmp.path());
        let err = m
            .materialize(&json!("nums.txt"), &Shape::array(Shape::Int))
            .unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_structured_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("data.json"), r#"{"a":1,"b":2}"#).unwrap();

        let m = materializer(tmp.path());
        let value = m
            .materialize(&json!("data.json"), &Shape::map(Shape::Int))
            .unwrap();
        assert_eq!(value, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_missing_file_falls_back_to_literal() {
        let tmp = tempfile::tempdir().unwrap();
        let m = materializer(tmp.path());
        let err = m
            .materialize(&json!("absent.json"), &Shape::map(Shape::Int))
            .unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_conform_rules() {
        assert_eq!(conform(json!(3.0), &Shape::Int).unwrap(), json!(3));
        assert!(conform(json!(3.5), &Shape::Int).is_err());
        assert_eq!(conform(json!(" 17 "), &Shape::Int).unwrap(), json!(17));
        assert_eq!(conform(json!("2.5"), &Shape::Float).unwrap(), json!(2.5));
        assert_eq!(conform(json!("TRUE"), &Shape::Bool).unwrap(), json!(true));
        assert_eq!(conform(json!(7), &Shape::Char).unwrap(), json!("7"));
        assert!(conform(json!("ab"), &Shape::Char).is_err());
        assert!(conform(json!(null), &Shape::Int).is_err());
        assert_eq!(
            conform(json!(null), &Shape::optional(Shape::Int)).unwrap(),
            json!(null)
        );
    }

    #[test]
    fn test_conform_object_layout() {
        let shape = Shape::object([
            ("a", Shape::Int),
            ("tag", Shape::optional(Shape::Str)),
        ]);
        assert_eq!(
            conform(json!({"a": "1", "extra": true}), &shape).unwrap(),
            json!({"a": 1, "tag": null})
        );
        let err = conform(json!({"tag": "x"}), &shape).unwrap_err();
        assert!(err.to_string().contains("missing field 'a'"));
    }

    #[test]
    fn test_object_fields_agree_across_raw_and_text() {
        let m = materializer(Path::new("."));
        let shape = Shape::object([("a", Shape::Int)]);
        let raw = json!({"a": 1, "extra": true});

        let from_value = m.materialize(&raw, &shape).unwrap();
        let from_text = m.materialize(&json!(raw.to_string()), &shape).unwrap();
        assert_eq!(from_value, json!({"a": 1}));
        assert_eq!(from_value, from_text);

        let exact = json!({"a": 1});
        assert_eq!(m.materialize(&exact, &shape).unwrap(), exact);
    }

    #[test]
    fn test_conform_error_path() {
        let err = conform(json!([[1], ["x"]]), &Shape::array(Shape::array(Shape::Int)))
            .unwrap_err();
        assert!(err.to_string().starts_with("[1]: [0]:"), "{err}");
    }
}
