// crates/cloudbar-schema/src/transform.rs
// ============================================================================
// Module: Schema Transforms
// Description: Recursive rewrites applied to response schemas.
// Purpose: Fold OpenAPI `nullable` into JSON Schema types and force required.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! OpenAPI 3.0 marks optional-null fields with `nullable: true`, which JSON
//! Schema 2020-12 does not understand. [`normalize_nullable`] folds the marker
//! into `type`. [`force_required`] promotes every declared property of every
//! object node to `required`, for calls that must return every documented
//! field.
//!
//! Invariants:
//! - Both rewrites return a new tree; the input is never mutated.
//! - Both rewrites are idempotent.
//! - Keyword maps (`properties`, `$defs`, ...) are walked as name-to-schema
//!   maps, so a property that happens to be named `nullable` or `type` is
//!   never mistaken for a keyword.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Keywords whose value maps names to subschemas.
const SCHEMA_MAP_KEYWORDS: [&str; 5] =
    ["properties", "patternProperties", "$defs", "definitions", "dependentSchemas"];

/// Type assumed for nullable nodes that declare no type.
const DEFAULT_NULLABLE_TYPE: &str = "string";

// ============================================================================
// SECTION: Nullable Normalization
// ============================================================================

/// Returns a copy of `schema` with every boolean `nullable` marker removed
/// and, where it was `true`, `"null"` folded into the node's `type`.
///
/// A node without `type` becomes `["string", "null"]`.
#[must_use]
pub fn normalize_nullable(schema: &Value) -> Value {
    match schema {
        Value::Object(node) => Value::Object(normalize_node(node)),
        Value::Array(items) => Value::Array(items.iter().map(normalize_nullable).collect()),
        other => other.clone(),
    }
}

/// Normalizes one schema object and recurses into its members.
fn normalize_node(node: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(node.len());
    for (key, value) in node {
        if key == "nullable" && value.is_boolean() {
            continue;
        }
        let rewritten = if SCHEMA_MAP_KEYWORDS.contains(&key.as_str()) {
            match value {
                Value::Object(named) => Value::Object(
                    named.iter().map(|(name, sub)| (name.clone(), normalize_nullable(sub))).collect(),
                ),
                other => normalize_nullable(other),
            }
        } else {
            normalize_nullable(value)
        };
        out.insert(key.clone(), rewritten);
    }
    if node.get("nullable").and_then(Value::as_bool) == Some(true) {
        let folded = fold_null(out.get("type"));
        out.insert("type".to_string(), folded);
    }
    out
}

/// Returns `ty` widened to also accept `null`, without duplicating it.
fn fold_null(ty: Option<&Value>) -> Value {
    match ty {
        None => Value::Array(vec![
            Value::String(DEFAULT_NULLABLE_TYPE.to_string()),
            Value::String("null".to_string()),
        ]),
        Some(Value::String(single)) if single == "null" => Value::String(single.clone()),
        Some(Value::String(single)) => {
            Value::Array(vec![Value::String(single.clone()), Value::String("null".to_string())])
        }
        Some(Value::Array(union)) => {
            let mut union = union.clone();
            if !union.iter().any(|entry| entry.as_str() == Some("null")) {
                union.push(Value::String("null".to_string()));
            }
            Value::Array(union)
        }
        Some(other) => other.clone(),
    }
}

// ============================================================================
// SECTION: Force Required
// ============================================================================

/// Returns a copy of `schema` where every `type: "object"` node with a
/// non-empty `properties` map lists all of its property names in `required`.
///
/// Recursion follows `properties` of object nodes and `items` of
/// `type: "array"` nodes. Nodes whose `type` is a union are left as they are.
#[must_use]
pub fn force_required(schema: &Value) -> Value {
    let mut out = schema.clone();
    force_required_in_place(&mut out);
    out
}

/// Applies the force-required rewrite to an owned copy.
fn force_required_in_place(schema: &mut Value) {
    let Value::Object(node) = schema else {
        return;
    };
    match node.get("type").and_then(Value::as_str) {
        Some("object") => {
            let Some(Value::Object(properties)) = node.get_mut("properties") else {
                return;
            };
            if properties.is_empty() {
                return;
            }
            let names: Vec<Value> = properties.keys().cloned().map(Value::String).collect();
            for property in properties.values_mut() {
                force_required_in_place(property);
            }
            node.insert("required".to_string(), Value::Array(names));
        }
        Some("array") => {
            if let Some(items) = node.get_mut("items") {
                force_required_in_place(items);
            }
        }
        _ => {}
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
