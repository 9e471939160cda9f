// crates/cloudbar-schema/src/structural/tests.rs
// ============================================================================
// Module: Structural Diff Tests
// Description: Unit tests for subset/prefix matching.
// Purpose: Pin the asymmetric comparison and its diagnostics.
// Dependencies: cloudbar-schema, tracing-test
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use serde_json::json;
use tracing_test::traced_test;

use super::matches;

#[test]
fn subset_semantics_are_asymmetric() {
    assert!(matches(&json!({}), &json!({"a": 1})));
    assert!(!matches(&json!({"a": 1}), &json!({})));
    assert!(!matches(&json!({"a": 1, "b": 2}), &json!({"a": 1})));
    assert!(matches(&json!([1, 2]), &json!([1, 2, 3])));
    assert!(!matches(&json!([1, 2, 3]), &json!([1, 2])));
}

#[test]
fn nested_values_compare_recursively() {
    let expected = json!({"drinks": [{"sku": "D1"}], "location": {"city": "Taipei"}});
    let actual = json!({
        "drinks": [{"sku": "D1", "name": "Latte"}, {"sku": "D2"}],
        "location": {"city": "Taipei", "zip": "100"},
        "_id": "abc"
    });
    assert!(matches(&expected, &actual));
    assert!(!matches(&json!({"location": {"city": "Tainan"}}), &actual));
}

#[test]
fn kind_mismatch_fails() {
    assert!(!matches(&json!({"a": {}}), &json!({"a": []})));
    assert!(!matches(&json!([]), &json!({})));
    assert!(!matches(&json!("1"), &json!(1)));
    assert!(!matches(&json!(null), &json!(0)));
}

#[test]
fn numbers_compare_numerically() {
    assert!(matches(&json!({"ratio": 1}), &json!({"ratio": 1.0})));
    assert!(!matches(&json!({"ratio": 1}), &json!({"ratio": 1.5})));
}

#[test]
#[traced_test]
fn missing_keys_are_reported() {
    assert!(!matches(&json!({"name": "x", "city": "y"}), &json!({"name": "x"})));
    assert!(logs_contain("expected keys are not in actual object"));
    assert!(logs_contain("city"));
}

#[test]
#[traced_test]
fn value_mismatch_names_the_path() {
    assert!(!matches(&json!({"a": [{"b": 1}]}), &json!({"a": [{"b": 2}]})));
    assert!(logs_contain("value mismatch"));
    assert!(logs_contain("$.a[0].b"));
}
