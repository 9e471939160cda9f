// crates/cloudbar-schema/src/validator.rs
// ============================================================================
// Module: Response Validator
// Description: Draft 2020-12 validation of response bodies per operation.
// Purpose: Report every schema violation, sorted by instance path.
// Dependencies: jsonschema, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`SchemaValidator`] compiles the response schema of one operation (after
//! nullable folding and, optionally, force-required) and collects all
//! violations of an instance. [`ResponseSchema`] is the test-facing entry
//! point: it names an operation and turns every failure mode into `false`
//! plus `error`-level diagnostics.
//!
//! Invariants:
//! - Violations are stably sorted by instance path segments; ties keep the
//!   validator's order.
//! - Identical inputs produce identical verdicts and violation lists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use tracing::error;

use crate::document::SchemaDocument;
use crate::error::SchemaError;
use crate::loader::SchemaFetcher;
use crate::loader::SchemaLoader;
use crate::transform::force_required;
use crate::transform::normalize_nullable;

// ============================================================================
// SECTION: Types
// ============================================================================

/// How strictly documented properties are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requirement {
    /// Only properties the schema itself lists as required.
    #[default]
    Partial,
    /// Every declared property of every object node.
    All,
}

impl Requirement {
    /// Returns true when every documented property must be present.
    #[must_use]
    pub const fn is_all(self) -> bool {
        matches!(self, Self::All)
    }
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer to the failing keyword in the schema.
    pub schema_path: String,
    /// Human-readable failure message.
    pub message: String,
    /// JSON pointer to the failing location in the instance.
    pub instance_path: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (at {})", self.schema_path, self.message, display_pointer(&self.instance_path))
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Compiled validator for one response schema.
pub struct SchemaValidator {
    /// Compiled draft 2020-12 validator.
    compiled: Validator,
}

impl SchemaValidator {
    /// Compiles the response schema of `path`/`method`/`status`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::OperationNotFound`] when the document has no
    /// schema for the triple and [`SchemaError::Compile`] when it is invalid.
    pub fn for_operation(
        document: &SchemaDocument,
        path: &str,
        method: &str,
        status: &str,
        requirement: Requirement,
    ) -> Result<Self, SchemaError> {
        let method = method.to_ascii_lowercase();
        let schema = document.response_schema(path, &method, status).ok_or_else(|| {
            SchemaError::OperationNotFound {
                path: path.to_string(),
                method: method.clone(),
                status: status.to_string(),
            }
        })?;
        let mut prepared = normalize_nullable(schema);
        if requirement.is_all() {
            prepared = force_required(&prepared);
        }
        let compiled = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .should_validate_formats(true)
            .build(&prepared)
            .map_err(|err| SchemaError::Compile {
                path: path.to_string(),
                method,
                status: status.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            compiled,
        })
    }

    /// Returns every violation of `instance`, sorted by instance path.
    #[must_use]
    pub fn violations(&self, instance: &Value) -> Vec<SchemaViolation> {
        let mut violations: Vec<SchemaViolation> = self
            .compiled
            .iter_errors(instance)
            .map(|err| SchemaViolation {
                schema_path: err.schema_path().to_string(),
                message: err.to_string(),
                instance_path: err.instance_path().to_string(),
            })
            .collect();
        violations.sort_by(|a, b| compare_pointers(&a.instance_path, &b.instance_path));
        violations
    }
}

/// Validates `instance` against the response schema of one operation.
///
/// # Errors
///
/// Returns [`SchemaError::OperationNotFound`] or [`SchemaError::Compile`]
/// when no usable schema exists for the operation.
pub fn validate(
    instance: &Value,
    document: &SchemaDocument,
    path: &str,
    method: &str,
    status: &str,
    require_all: bool,
) -> Result<Vec<SchemaViolation>, SchemaError> {
    let requirement = if require_all { Requirement::All } else { Requirement::Partial };
    let validator = SchemaValidator::for_operation(document, path, method, status, requirement)?;
    Ok(validator.violations(instance))
}

// ============================================================================
// SECTION: Response Schema
// ============================================================================

/// Named response schema of one API operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    /// Path template as documented (`/locations/{full_code}`).
    path: String,
    /// Lower-cased HTTP method.
    method: String,
    /// Numeric status code as a string.
    status: String,
}

impl ResponseSchema {
    /// Names the response schema of `path`/`method`/`status`.
    #[must_use]
    pub fn new(path: impl Into<String>, method: &str, status: u16) -> Self {
        Self {
            path: path.into(),
            method: method.to_ascii_lowercase(),
            status: status.to_string(),
        }
    }

    /// Returns the path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the lower-cased method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the status code string.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Verifies `instance` against this operation's schema.
    ///
    /// Every failure, including a missing schema, is logged and yields `false`.
    #[must_use]
    pub fn verify(&self, document: &SchemaDocument, instance: &Value, requirement: Requirement) -> bool {
        let validator = match SchemaValidator::for_operation(
            document,
            &self.path,
            &self.method,
            &self.status,
            requirement,
        ) {
            Ok(validator) => validator,
            Err(err) => {
                error!(operation = %self, "{err}");
                return false;
            }
        };
        let violations = validator.violations(instance);
        for violation in &violations {
            error!(
                operation = %self,
                schema_path = %violation.schema_path,
                instance_path = %display_pointer(&violation.instance_path),
                "validation error: {}",
                violation.message
            );
        }
        violations.is_empty()
    }

    /// Verifies a raw JSON response body.
    #[must_use]
    pub fn verify_text(&self, document: &SchemaDocument, body: &str, requirement: Requirement) -> bool {
        match serde_json::from_str::<Value>(body) {
            Ok(instance) => self.verify(document, &instance, requirement),
            Err(err) => {
                error!(operation = %self, "response body is not valid json: {err}");
                false
            }
        }
    }

    /// Loads the schema document and verifies `instance` against it.
    ///
    /// An unavailable document is logged and yields `false`.
    #[must_use]
    pub fn verify_loaded(
        &self,
        loader: &SchemaLoader,
        fetcher: Option<&dyn SchemaFetcher>,
        instance: &Value,
        requirement: Requirement,
    ) -> bool {
        match loader.load(fetcher) {
            Ok(document) => self.verify(&document, instance, requirement),
            Err(err) => {
                error!(operation = %self, "{err}");
                false
            }
        }
    }
}

impl fmt::Display for ResponseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]({})", self.path, self.method, self.status)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// One JSON pointer segment for ordering purposes.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
    /// Array index; sorts before names and numerically among indices.
    Index(u64),
    /// Object key.
    Name(&'a str),
}

/// Orders two instance pointers segment by segment.
fn compare_pointers(left: &str, right: &str) -> Ordering {
    segments(left).cmp(segments(right))
}

/// Splits a JSON pointer into ordered segments.
fn segments(pointer: &str) -> impl Iterator<Item = Segment<'_>> {
    pointer.split('/').skip(1).map(|raw| match raw.parse::<u64>() {
        Ok(index) => Segment::Index(index),
        Err(_) => Segment::Name(raw),
    })
}

/// Renders the root pointer as `/` for readable diagnostics.
fn display_pointer(pointer: &str) -> &str {
    if pointer.is_empty() { "/" } else { pointer }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
