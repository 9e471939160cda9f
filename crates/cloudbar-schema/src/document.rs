// crates/cloudbar-schema/src/document.rs
// ============================================================================
// Module: Schema Document
// Description: Read-only view over a dereferenced OpenAPI document.
// Purpose: Locate response schemas and request field enums by operation.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A [`SchemaDocument`] wraps the fully expanded document. Response schemas
//! live at `paths.<path>.<method>.responses.<status>.content."application/json".schema`;
//! selectable response fields live in the `fields` query parameter enum.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Media type whose schema is used for response validation.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Query parameter that lists optional response fields.
const FIELDS_PARAMETER: &str = "fields";

// ============================================================================
// SECTION: Document
// ============================================================================

/// Dereferenced API schema document.
///
/// # Invariants
/// - Contains no unresolved `$ref` nodes apart from recursion breaks.
/// - Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    /// Expanded document root.
    root: Value,
}

impl SchemaDocument {
    /// Wraps an already dereferenced document.
    #[must_use]
    pub const fn new(root: Value) -> Self {
        Self {
            root,
        }
    }

    /// Returns the document root.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    /// Returns the JSON response schema for an operation, if documented.
    ///
    /// `method` is matched lower-cased, as OpenAPI documents spell it.
    #[must_use]
    pub fn response_schema(&self, path: &str, method: &str, status: &str) -> Option<&Value> {
        self.operation(path, method)?
            .get("responses")?
            .get(status)?
            .get("content")?
            .get(JSON_MEDIA_TYPE)?
            .get("schema")
            .filter(|schema| !is_empty_schema(schema))
    }

    /// Returns the values a caller may request through repeated `fields[]`
    /// query parameters; empty when the operation declares none.
    #[must_use]
    pub fn request_fields(&self, path: &str, method: &str) -> Vec<String> {
        let Some(parameters) = self
            .operation(path, method)
            .and_then(|operation| operation.get("parameters"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };
        parameters
            .iter()
            .find(|param| param.get("name").and_then(Value::as_str) == Some(FIELDS_PARAMETER))
            .and_then(|param| param.pointer("/schema/items/enum"))
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Returns the operation object for a path template and method.
    fn operation(&self, path: &str, method: &str) -> Option<&Value> {
        self.root.get("paths")?.get(path)?.get(method.to_ascii_lowercase())
    }
}

/// Returns true for `null` and `{}` schemas; both count as undocumented.
fn is_empty_schema(schema: &Value) -> bool {
    match schema {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
