// crates/cloudbar-resources/src/error.rs
// ============================================================================
// Module: Resource Errors
// Description: Error taxonomy for resource lifecycles.
// Purpose: Distinguish payload build faults from transport faults.
// Dependencies: cloudbar-client, cloudbar-schema, thiserror
// ============================================================================

//! ## Overview
//! Lifecycle operations abort on the first error. Payload build failures
//! happen before any creating call is made.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cloudbar_client::ApiError;
use cloudbar_client::PathError;
use cloudbar_schema::SchemaError;
use thiserror::Error;

use crate::kind::ResourceKind;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Resource lifecycle errors.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A call failed or returned an unexpected status.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// A path could not be resolved.
    #[error(transparent)]
    Path(#[from] PathError),
    /// The schema document could not be used.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A payload could not be assembled; no creating call was made.
    #[error("{kind} payload build failed: {reason}")]
    PayloadBuild {
        /// Resource kind being built.
        kind: ResourceKind,
        /// Failure detail.
        reason: String,
    },
    /// A response lacked an expected field.
    #[error("{kind} response is missing {field}")]
    MissingField {
        /// Resource kind being processed.
        kind: ResourceKind,
        /// JSON pointer of the absent field.
        field: String,
    },
    /// The operation needs an identity the instance does not have yet.
    #[error("{kind} has no identity; create it first")]
    NotCreated {
        /// Resource kind.
        kind: ResourceKind,
    },
    /// Machine key material could not be produced or used.
    #[error("machine key failure: {0}")]
    Key(String),
}

impl ResourceError {
    /// Builds a [`ResourceError::PayloadBuild`].
    pub(crate) fn payload(kind: ResourceKind, reason: impl Into<String>) -> Self {
        Self::PayloadBuild {
            kind,
            reason: reason.into(),
        }
    }
}
