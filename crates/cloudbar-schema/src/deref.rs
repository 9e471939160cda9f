// crates/cloudbar-schema/src/deref.rs
// ============================================================================
// Module: Schema Dereferencing
// Description: Eager `$ref` expansion for OpenAPI documents.
// Purpose: Produce a schema tree with internal and external refs inlined.
// Dependencies: serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`dereference`] walks a document and replaces every `{"$ref": ...}` node
//! with the subtree it points to. Internal refs (`#/components/...`) resolve
//! against the document being walked; external refs (`common.json#/Foo`)
//! resolve relative to that document's base URI and are loaded from disk.
//! Invariants:
//! - Sibling keys next to `$ref` are merged over the referenced object.
//! - A ref that re-enters itself is replaced by an empty (accept-all) schema
//!   instead of expanding forever.
//! - Only `file:` external documents are supported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fs;

use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::SchemaError;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Returns a copy of `root` with every `$ref` expanded.
///
/// `base` is the URI `root` was loaded from; external refs are resolved
/// relative to it.
///
/// # Errors
///
/// Returns [`SchemaError::UnresolvableRef`] when a pointer does not exist, an
/// external document cannot be read or parsed, or a ref uses a scheme other
/// than `file:`.
pub fn dereference(root: &Value, base: &Url) -> Result<Value, SchemaError> {
    let mut resolver = Resolver::new(root.clone(), base);
    let base_key = document_key(base);
    let mut stack = Vec::new();
    resolver.expand(root, &base_key, &mut stack)
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Expansion state shared across one dereference pass.
struct Resolver {
    /// Loaded documents keyed by URI without fragment.
    documents: HashMap<String, Value>,
}

impl Resolver {
    /// Seeds the resolver with the root document.
    fn new(root: Value, base: &Url) -> Self {
        let mut documents = HashMap::new();
        documents.insert(document_key(base), root);
        Self {
            documents,
        }
    }

    /// Expands one node that lives in the document identified by `doc_key`.
    fn expand(
        &mut self,
        node: &Value,
        doc_key: &str,
        stack: &mut Vec<String>,
    ) -> Result<Value, SchemaError> {
        match node {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.expand_ref(reference, map, doc_key, stack);
                }
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.expand(value, doc_key, stack)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.expand(item, doc_key, stack))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    /// Resolves a `$ref` node and merges its sibling keys.
    fn expand_ref(
        &mut self,
        reference: &str,
        node: &Map<String, Value>,
        doc_key: &str,
        stack: &mut Vec<String>,
    ) -> Result<Value, SchemaError> {
        let (target_doc, pointer) = self.locate(reference, doc_key)?;
        let identity = format!("{target_doc}#{pointer}");
        if stack.contains(&identity) {
            debug!(reference, "recursive $ref left as an accept-all schema");
            return Ok(Value::Object(Map::new()));
        }
        let target = self
            .documents
            .get(&target_doc)
            .and_then(|doc| doc.pointer(&pointer))
            .cloned()
            .ok_or_else(|| SchemaError::UnresolvableRef {
                reference: reference.to_string(),
                reason: format!("pointer {pointer} not found"),
            })?;

        stack.push(identity);
        let expanded = self.expand(&target, &target_doc, stack);
        stack.pop();
        let mut expanded = expanded?;

        if let Value::Object(out) = &mut expanded {
            for (key, value) in node {
                if key == "$ref" {
                    continue;
                }
                out.insert(key.clone(), self.expand(value, doc_key, stack)?);
            }
        }
        Ok(expanded)
    }

    /// Splits a ref into (document key, decoded JSON pointer), loading the
    /// target document when it is not yet known.
    fn locate(&mut self, reference: &str, doc_key: &str) -> Result<(String, String), SchemaError> {
        let (doc_part, fragment) = reference.split_once('#').unwrap_or((reference, ""));
        let pointer = percent_decode(fragment);
        if doc_part.is_empty() {
            return Ok((doc_key.to_string(), pointer));
        }

        let unresolvable = |reason: String| SchemaError::UnresolvableRef {
            reference: reference.to_string(),
            reason,
        };
        let current = Url::parse(doc_key).map_err(|err| unresolvable(err.to_string()))?;
        let target = current.join(doc_part).map_err(|err| unresolvable(err.to_string()))?;
        let target_key = document_key(&target);
        if !self.documents.contains_key(&target_key) {
            if target.scheme() != "file" {
                return Err(unresolvable(format!("unsupported scheme {}", target.scheme())));
            }
            let path = target
                .to_file_path()
                .map_err(|()| unresolvable("invalid file uri".to_string()))?;
            let raw = fs::read_to_string(&path)
                .map_err(|err| unresolvable(format!("read {}: {err}", path.display())))?;
            let document: Value = serde_json::from_str(&raw)
                .map_err(|err| unresolvable(format!("parse {}: {err}", path.display())))?;
            debug!(document = %target_key, "loaded external schema document");
            self.documents.insert(target_key.clone(), document);
        }
        Ok((target_key, pointer))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the URI string without its fragment.
fn document_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// Decodes `%XX` escapes in a ref fragment; malformed escapes pass through.
fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%'
            && let Some(hex) = raw.get(idx + 1..idx + 3)
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            idx += 3;
            continue;
        }
        out.push(bytes[idx]);
        idx += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
