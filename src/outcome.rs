//! Comparable invocation results
//!
//! An [`Outcome`] wraps the value an operation returned. Comparing it against
//! an expected value first coerces expected text into the result's shape, so
//! cases can write `"[1,2,3]"` or `"answer.json"` where the operation returns
//! an array. In unordered mode both sides are canonicalized before the deep
//! comparison.

use serde_json::{Number, Value};
use std::fmt;

use crate::canonical::{as_integer, canonicalize, compare_numbers};
use crate::common::Result;
use crate::materialize::Materializer;
use crate::shape::Shape;

/// How sequences are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    /// Element order matters
    #[default]
    Ordered,
    /// Sequences are compared as multisets, at every nesting level
    Unordered,
}

/// Result of an invocation, comparable against expected values
#[derive(Debug, Clone)]
pub struct Outcome {
    value: Value,
    comparison: Comparison,
    tolerance: f64,
    materializer: Materializer,
}

impl Outcome {
    /// Wrap a raw result with ordered, exact comparison
    pub fn new(value: Value, materializer: Materializer) -> Self {
        Self {
            value,
            comparison: Comparison::Ordered,
            tolerance: 0.0,
            materializer,
        }
    }

    /// The value the operation returned
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Unwrap the returned value
    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Same result, compared without regard to sequence order
    pub fn unordered(&self) -> Self {
        Self {
            comparison: Comparison::Unordered,
            ..self.clone()
        }
    }

    /// Same result, with numbers equal when within `tolerance` of each other
    pub fn with_tolerance(&self, tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.abs(),
            ..self.clone()
        }
    }

    /// Compare against `expected`
    ///
    /// Fails only when expected text cannot be coerced into the result's
    /// shape; a plain mismatch is `Ok(false)`.
    pub fn matches(&self, expected: impl Into<Value>) -> Result<bool> {
        let mut expected = expected.into();
        if !self.value.is_string() && expected.is_string() {
            expected = self
                .materializer
                .expected(&expected, &Shape::of(&self.value))?;
        }

        let equal = match self.comparison {
            Comparison::Ordered => deep_equal(&self.value, &expected, self.tolerance),
            Comparison::Unordered => deep_equal(
                &canonicalize(&self.value),
                &canonicalize(&expected),
                self.tolerance,
            ),
        };

        if !equal {
            tracing::debug!(actual = %self.value, %expected, comparison = ?self.comparison, "Result mismatch");
        }
        Ok(equal)
    }

    /// Compare against `expected`, treating a failed coercion as inequality
    pub fn equals(&self, expected: impl Into<Value>) -> bool {
        self.matches(expected).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Expected value not comparable");
            false
        })
    }
}

impl PartialEq<Value> for Outcome {
    fn eq(&self, other: &Value) -> bool {
        self.equals(other.clone())
    }
}

impl PartialEq<&str> for Outcome {
    fn eq(&self, other: &&str) -> bool {
        self.equals(*other)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Structural equality; numbers compare by value across integer and float
/// representations
pub fn deep_equal(a: &Value, b: &Value, tolerance: f64) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y, tolerance),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_equal(l, r, tolerance))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, l)| {
                    y.get(k)
                        .map(|r| deep_equal(l, r, tolerance))
                        .unwrap_or(false)
                })
        }
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number, tolerance: f64) -> bool {
    if tolerance == 0.0 {
        return compare_numbers(a, b).is_eq();
    }

    if let (Some(x), Some(y)) = (as_integer(a), as_integer(b)) {
        return (x - y).unsigned_abs() as f64 <= tolerance;
    }

    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() <= tolerance,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::FilesConfig;
    use crate::common::Error;
    use serde_json::json;

    fn outcome(value: Value) -> Outcome {
        Outcome::new(value, Materializer::new(".", FilesConfig::default()))
    }

    #[test]
    fn test_ordered_vs_unordered() {
        let result = outcome(json!([3, 1, 2]));
        assert!(!result.equals("[1,2,3]"));
        assert!(result.unordered().equals("[1,2,3]"));
        assert_eq!(result.comparison(), Comparison::Ordered);
    }

    #[test]
    fn test_unordered_sorts_inner_arrays() {
        let result = outcome(json!([[2, 1], [4, 3]])).unordered();
        assert!(result.equals(json!([[1, 2], [3, 4]])));
        assert!(result.equals(json!([[4, 3], [1, 2]])));
        assert!(!result.equals(json!([[1, 2], [3, 5]])));
    }

    #[test]
    fn test_expected_text_is_coerced() {
        assert!(outcome(json!(42)).equals("42"));
        assert!(outcome(json!(true)).equals("true"));
        assert!(outcome(json!({"a": 1})).equals(r#"{"a": 1}"#));
    }

    #[test]
    fn test_expected_text_for_null_result() {
        let none = outcome(Value::Null);
        assert!(matches!(none.matches("null"), Ok(true)));
        assert!(none == "null");
        assert!(!none.equals("0"));
        assert!(matches!(none.matches("nothing"), Err(Error::BadExpected { .. })));
    }

    #[test]
    fn test_text_result_is_not_coerced() {
        let result = outcome(json!("42"));
        assert!(result.equals("42"));
        assert!(!result.equals(42));
    }

    #[test]
    fn test_coercion_failure() {
        let result = outcome(json!([1, 2]));
        assert!(matches!(
            result.matches("not json"),
            Err(Error::BadExpected { .. })
        ));
        assert!(!result.equals("not json"));
    }

    #[test]
    fn test_numbers_across_representations() {
        assert!(outcome(json!(2.0)).equals(2));
        assert!(outcome(json!([1, 2])).equals(json!([1.0, 2.0])));
        assert!(!outcome(json!(0.1 + 0.2)).equals(0.3));
        assert!(outcome(json!(0.1 + 0.2)).with_tolerance(1e-9).equals(0.3));
        assert!(outcome(json!(10)).with_tolerance(1.0).equals(11));
    }

    #[test]
    fn test_large_integers_against_floats_are_exact() {
        let big = json!(9007199254740993u64);
        assert!(!outcome(big.clone()).equals(json!(9007199254740992.0)));
        assert!(outcome(json!(9007199254740992u64)).equals(json!(9007199254740992.0)));

        let a = json!([9007199254740993u64, 9007199254740992.0, 9007199254740992u64]);
        let b = json!([9007199254740992u64, 9007199254740992.0, 9007199254740993u64]);
        assert!(outcome(a.clone()).unordered().equals(b.clone()));
        assert!(outcome(b).unordered().equals(a));
    }

    #[test]
    fn test_unordered_commutes() {
        let a = json!([[1, 2], [3]]);
        let b = json!([[3], [2, 1]]);
        assert_eq!(
            outcome(a.clone()).unordered().equals(b.clone()),
            outcome(b).unordered().equals(a)
        );
    }

    #[test]
    fn test_length_mismatch() {
        assert!(!outcome(json!([1, 2])).equals(json!([1, 2, 3])));
        assert!(!outcome(json!([[1], [2, 3]])).unordered().equals(json!([[1, 2], [3]])));
    }

    #[test]
    fn test_objects_compare_by_key() {
        assert!(outcome(json!({"a": 1, "b": [1, 2]})).equals(json!({"b": [1, 2], "a": 1})));
        assert!(!outcome(json!({"a": 1})).equals(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_partial_eq() {
        let result = outcome(json!([1, 2, 3]));
        assert!(result == json!([1, 2, 3]));
        assert!(result == "[1, 2, 3]");
        assert_eq!(result.to_string(), "[1,2,3]");
    }
}
