// crates/cloudbar-schema/src/structural.rs
// ============================================================================
// Module: Structural Diff
// Description: Asymmetric subset comparison of JSON values.
// Purpose: Confirm the backend persisted every field a client sent.
// Dependencies: serde_json, tracing
// ============================================================================

//! ## Overview
//! [`matches`] holds when `expected` is a structural subset of `actual`:
//! every expected key exists with a matching value, and every expected array
//! element matches the actual element at the same index. Extra actual keys
//! and trailing actual elements are ignored, because the server may add
//! computed fields. The first mismatch is logged at `warn` and the check
//! returns `false`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use tracing::warn;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Returns true when `expected` is a subset (objects) or prefix (arrays) of
/// `actual`, recursively. Scalars compare by value; numbers compare
/// numerically, so `1` matches `1.0`.
#[must_use]
pub fn matches(expected: &Value, actual: &Value) -> bool {
    match_at(expected, actual, "$")
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Compares one node, tracking its location for diagnostics.
fn match_at(expected: &Value, actual: &Value, at: &str) -> bool {
    match expected {
        Value::Object(expected_map) => match actual {
            Value::Object(actual_map) => match_object(expected_map, actual_map, at),
            _ => {
                warn!(path = at, expected = %expected, actual = %actual, "expected an object");
                false
            }
        },
        Value::Array(expected_items) => match actual {
            Value::Array(actual_items) if actual_items.len() >= expected_items.len() => expected_items
                .iter()
                .zip(actual_items)
                .enumerate()
                .all(|(index, (want, got))| match_at(want, got, &format!("{at}[{index}]"))),
            _ => {
                warn!(path = at, expected = %expected, actual = %actual, "expected list is not a prefix of actual list");
                false
            }
        },
        Value::Number(want) => {
            let equal = matches!(actual, Value::Number(got) if numbers_equal(want, got));
            if !equal {
                warn!(path = at, expected = %expected, actual = %actual, "value mismatch");
            }
            equal
        }
        _ => {
            if expected != actual {
                warn!(path = at, expected = %expected, actual = %actual, "value mismatch");
                return false;
            }
            true
        }
    }
}

/// Compares an expected object against an actual object.
fn match_object(expected: &Map<String, Value>, actual: &Map<String, Value>, at: &str) -> bool {
    let missing: Vec<&str> =
        expected.keys().filter(|key| !actual.contains_key(*key)).map(String::as_str).collect();
    if !missing.is_empty() {
        warn!(path = at, missing = ?missing, "expected keys are not in actual object");
        return false;
    }
    expected.iter().all(|(key, want)| {
        let child = format!("{at}.{key}");
        actual.get(key).is_some_and(|got| match_at(want, got, &child))
    })
}

/// Numeric equality across integer and float representations.
fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        return a == b;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
