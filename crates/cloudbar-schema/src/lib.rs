// crates/cloudbar-schema/src/lib.rs
// ============================================================================
// Module: CloudBar Schema Library
// Description: Response-schema verification engine for the CloudBar API.
// Purpose: Load, dereference, normalize, and validate against the API schema.
// Dependencies: jsonschema, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! This crate owns everything the harness needs to judge a response body:
//! - [`SchemaLoader`] mirrors the remote OpenAPI document on disk and returns
//!   a fully dereferenced [`SchemaDocument`].
//! - [`transform`] rewrites schema subtrees (nullable folding, force-required).
//! - [`SchemaValidator`] and [`ResponseSchema`] validate JSON instances and
//!   report every violation sorted by instance path.
//! - [`structural::matches`] compares an expected subset against actual data.
//!
//! Invariants:
//! - Loaded documents are immutable; transforms always return copies.
//! - Content-level checks report failures as `false` plus diagnostics and
//!   never escape as errors.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod deref;
pub mod document;
pub mod error;
pub mod loader;
pub mod structural;
pub mod transform;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::SchemaDocument;
pub use error::SchemaError;
pub use loader::SchemaFetcher;
pub use loader::SchemaLoader;
pub use structural::matches;
pub use transform::force_required;
pub use transform::normalize_nullable;
pub use validator::Requirement;
pub use validator::ResponseSchema;
pub use validator::SchemaValidator;
pub use validator::SchemaViolation;
pub use validator::validate;
