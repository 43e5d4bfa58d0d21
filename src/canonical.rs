//! Canonical ordering for order-insensitive comparison
//!
//! [`canonicalize`] sorts every array, innermost first, so two values holding
//! the same multiset of elements end up structurally identical. Objects and
//! scalars are left as they are; text is not treated as a sequence.

use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Recursively sort all arrays in `value`
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut sorted: Vec<Value> = items.iter().map(canonicalize).collect();
            sorted.sort_by(compare);
            Value::Array(sorted)
        }
        other => other.clone(),
    }
}

/// Total order used to sort canonical arrays
///
/// - arrays: shorter first, then element by element
/// - scalars: natural order (`false < true`, numeric, lexicographic)
/// - different kinds: `null < bool < number < string < array < object`
///
/// Objects have no natural order and compare equal to each other, so the
/// stable sort keeps them in their original relative order.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.iter()
                .zip(y)
                .map(|(l, r)| compare(l, r))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) | (Value::Object(_), Value::Object(_)) => Ordering::Equal,
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Integer value of `n`, if it has one
pub(crate) fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact numeric order across integer and float representations
pub(crate) fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => compare_integer_float(x, b.as_f64().unwrap_or(f64::NAN)),
        (None, Some(y)) => compare_integer_float(y, a.as_f64().unwrap_or(f64::NAN)).reverse(),
        (None, None) => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
        }
    }
}

/// Compare without rounding `i` to the nearest float
fn compare_integer_float(i: i128, f: f64) -> Ordering {
    // 2^127; every i128 lies in [-BOUND, BOUND)
    const BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

    if f.is_nan() {
        return (i as f64).total_cmp(&f);
    }
    if f >= BOUND {
        return Ordering::Less;
    }
    if f < -BOUND {
        return Ordering::Greater;
    }

    let floor = f.floor();
    match i.cmp(&(floor as i128)) {
        Ordering::Equal if f > floor => Ordering::Less,
        other => other,
    }
}
