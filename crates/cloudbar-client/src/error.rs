// crates/cloudbar-client/src/error.rs
// ============================================================================
// Module: Client Errors
// Description: Error types for path resolution and API calls.
// Purpose: Make construction and transport faults fatal and descriptive.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`PathError`] reports templates bound without every placeholder.
//! [`ApiError`] covers transport, authentication, status assertion, and
//! body decoding failures. Both abort the operation that raised them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

// ============================================================================
// SECTION: Path Errors
// ============================================================================

/// Path template resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// One or more placeholders had no bound value.
    #[error("missing required path parameters for {template}: {}", join_names(.missing))]
    MissingParameters {
        /// Template being resolved.
        template: String,
        /// Placeholder names without a value, sorted.
        missing: BTreeSet<String>,
    },
}

impl PathError {
    /// Returns the missing placeholder names.
    #[must_use]
    pub const fn missing(&self) -> &BTreeSet<String> {
        match self {
            Self::MissingParameters {
                missing, ..
            } => missing,
        }
    }
}

/// Renders a name set as `{a, b}`.
fn join_names(names: &BTreeSet<String>) -> String {
    let joined: Vec<&str> = names.iter().map(String::as_str).collect();
    format!("{{{}}}", joined.join(", "))
}

// ============================================================================
// SECTION: API Errors
// ============================================================================

/// API call errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A path could not be resolved.
    #[error(transparent)]
    Path(#[from] PathError),
    /// The HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    ClientBuild(String),
    /// The backend host and path do not form a valid URL.
    #[error("invalid request url {url}: {reason}")]
    InvalidUrl {
        /// Offending URL text.
        url: String,
        /// Parser message.
        reason: String,
    },
    /// The request did not complete.
    #[error("{method} {url} failed: {source}")]
    Transport {
        /// HTTP method.
        method: String,
        /// Request URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// Login was rejected or returned no access token.
    #[error("login failed with status {status}: {body}")]
    Auth {
        /// Login response status.
        status: u16,
        /// Login response body.
        body: String,
    },
    /// The call returned a status other than the asserted one.
    #[error("Expected status code {expected}, got {actual} instead.\nResponse: {body}")]
    UnexpectedStatus {
        /// Asserted status code.
        expected: u16,
        /// Observed status code.
        actual: u16,
        /// Response body for diagnosis.
        body: String,
    },
    /// A response body was not the JSON the caller expected.
    #[error("response body decode failed: {0}")]
    Decode(String),
}
