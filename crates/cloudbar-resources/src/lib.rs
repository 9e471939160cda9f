// crates/cloudbar-resources/src/lib.rs
// ============================================================================
// Module: CloudBar Resources Library
// Description: Lifecycle engine for CloudBar API resources.
// Purpose: Create, read, update, and delete test records per resource kind.
// Dependencies: cloudbar-client, cloudbar-schema, k256, rand, serde_json, time
// ============================================================================

//! ## Overview
//! - [`ResourceKind`] carries a static descriptor per kind and drives the
//!   generic detail, list, and random-id reads.
//! - [`ResourceEndpoint`] is the lifecycle contract; [`endpoints`] holds the
//!   seven variants and a kind-driven factory.
//! - [`random`] produces the random field values payloads are built from.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod endpoint;
pub mod endpoints;
pub mod error;
pub mod kind;
pub mod random;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use endpoint::Payload;
pub use endpoint::ResourceEndpoint;
pub use endpoint::ResourceState;
pub use endpoints::Corporation;
pub use endpoints::Drink;
pub use endpoints::EndpointDefaults;
pub use endpoints::Flavor;
pub use endpoints::Location;
pub use endpoints::Machine;
pub use endpoints::MachineTokens;
pub use endpoints::Menu;
pub use endpoints::User;
pub use endpoints::new_endpoint;
pub use error::ResourceError;
pub use kind::DeleteStyle;
pub use kind::ResourceDescriptor;
pub use kind::ResourceKind;
