// crates/cloudbar-schema/src/error.rs
// ============================================================================
// Module: Schema Errors
// Description: Error taxonomy for schema loading and lookup.
// Purpose: Distinguish unavailable documents from missing operations.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Schema errors describe configuration faults: the document could not be
//! obtained, a `$ref` could not be resolved, or the document has no entry
//! for a path/method/status triple. Verification entry points convert these
//! into soft failures; loaders and lookups surface them directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema loading and lookup errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// No cached document exists and a live fetch did not succeed.
    #[error("schema unavailable at {path}: {reason}")]
    Unavailable {
        /// Expected cache location.
        path: PathBuf,
        /// Why neither the cache nor the fetch produced a document.
        reason: String,
    },
    /// The document on disk is not valid JSON.
    #[error("schema document {path} is not valid json: {source}")]
    Parse {
        /// Document location.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },
    /// A `$ref` pointer could not be resolved.
    #[error("unresolvable $ref {reference}: {reason}")]
    UnresolvableRef {
        /// Reference string as written in the document.
        reference: String,
        /// Resolution failure detail.
        reason: String,
    },
    /// The document has no response schema for the requested operation.
    #[error("schema not found for path: {path}[{method}]({status})")]
    OperationNotFound {
        /// Path template.
        path: String,
        /// Lower-cased HTTP method.
        method: String,
        /// Numeric status code as a string.
        status: String,
    },
    /// The extracted response schema could not be compiled.
    #[error("schema for {path}[{method}]({status}) failed to compile: {reason}")]
    Compile {
        /// Path template.
        path: String,
        /// Lower-cased HTTP method.
        method: String,
        /// Numeric status code as a string.
        status: String,
        /// Compiler message.
        reason: String,
    },
    /// Cache file I/O failed.
    #[error("schema cache io failure at {path}: {source}")]
    Io {
        /// File location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
