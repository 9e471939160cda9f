// crates/cloudbar-resources/src/endpoints/mod.rs
// ============================================================================
// Module: Resource Endpoint Variants
// Description: The seven resource kinds and a kind-driven factory.
// Purpose: Construct endpoints for parametrized lifecycle suites.
// Dependencies: cloudbar-resources
// ============================================================================

//! ## Overview
//! One module per resource kind. [`new_endpoint`] builds a boxed endpoint
//! for a kind so suites can iterate [`ResourceKind::ALL`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod corporation;
pub mod drink;
pub mod flavor;
pub mod location;
pub mod machine;
pub mod menu;
pub mod user;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use corporation::Corporation;
pub use drink::Drink;
pub use flavor::Flavor;
pub use location::Location;
pub use machine::Machine;
pub use machine::MachineTokens;
pub use menu::Menu;
pub use user::User;

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::endpoint::ResourceEndpoint;
use crate::kind::ResourceKind;

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Defaults applied when constructing endpoints by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDefaults {
    /// Corporation that owns new locations.
    pub hq_user_name: String,
}

/// Builds a fresh endpoint for `kind`.
#[must_use]
pub fn new_endpoint(kind: ResourceKind, defaults: &EndpointDefaults) -> Box<dyn ResourceEndpoint> {
    match kind {
        ResourceKind::Location => Box::new(Location::new(defaults.hq_user_name.clone())),
        ResourceKind::User => Box::new(User::new()),
        ResourceKind::Corporation => Box::new(Corporation::new()),
        ResourceKind::Machine => Box::new(Machine::new()),
        ResourceKind::Flavor => Box::new(Flavor::new()),
        ResourceKind::Drink => Box::new(Drink::new()),
        ResourceKind::Menu => Box::new(Menu::new()),
    }
}
