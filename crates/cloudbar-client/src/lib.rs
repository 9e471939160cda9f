// crates/cloudbar-client/src/lib.rs
// ============================================================================
// Module: CloudBar Client Library
// Description: Endpoint catalog and blocking transport for the CloudBar API.
// Purpose: Resolve logical endpoints and execute status-asserted calls.
// Dependencies: cloudbar-schema, reqwest, serde_json, tracing
// ============================================================================

//! ## Overview
//! - [`ApiPath`] is the immutable endpoint catalog; [`ApiPath::resolve`]
//!   binds template parameters and fails on any missing one.
//! - [`ApiClient`] logs in, injects bearer headers, and asserts statuses.
//! - [`ApiClient`] also fetches the schema document on a cache miss.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod country;
pub mod error;
pub mod http;
pub mod paths;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ApiClient;
pub use client::ApiResponse;
pub use client::ClientConfig;
pub use client::Credentials;
pub use client::RequestOptions;
pub use country::Country;
pub use error::ApiError;
pub use error::PathError;
pub use http::Method;
pub use http::ResponseCode;
pub use paths::ApiPath;
pub use paths::PathParams;
pub use paths::PathTemplate;
pub use paths::ResolvedPath;
pub use paths::TokenKind;
