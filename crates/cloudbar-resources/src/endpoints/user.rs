// crates/cloudbar-resources/src/endpoints/user.rs
// ============================================================================
// Module: User Endpoint
// Description: Platform user accounts.
// Purpose: Create, update, and deactivate users.
// Dependencies: cloudbar-client, serde_json
// ============================================================================

//! ## Overview
//! Users are keyed by `user_name` and deleted softly by setting their
//! status to inactive.
//! Invariants:
//! - Password fields are dropped from the expected state after create.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cloudbar_client::ApiClient;
use cloudbar_client::ApiPath;
use cloudbar_client::ApiResponse;
use cloudbar_client::Method;
use serde_json::Value;
use serde_json::json;

use crate::endpoint::Payload;
use crate::endpoint::ResourceEndpoint;
use crate::endpoint::ResourceState;
use crate::endpoint::payload_of;
use crate::endpoint::send_json;
use crate::error::ResourceError;
use crate::kind::INACTIVE_STATUS;
use crate::kind::ResourceKind;
use crate::random::CharClass;
use crate::random::pick;
use crate::random::random_bool;
use crate::random::random_country;
use crate::random::random_string;

// ============================================================================
// SECTION: Reference Values
// ============================================================================

/// Account types a test user may hold.
const USER_TYPES: [&str; 4] = ["Botrista", "FAE", "Operation", "Distributor"];
/// Preferred unit systems.
const USER_UNITS: [&str; 2] = ["imperial", "metric"];
/// Fields the detail read never echoes back.
const SECRET_FIELDS: [&str; 2] = ["password", "password_confirmation"];

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Platform user lifecycle.
#[derive(Debug, Clone, Default)]
pub struct User {
    /// Lifecycle state.
    state: ResourceState,
}

impl User {
    /// Creates an endpoint with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResourceEndpoint for User {
    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn prepare_create_payload(&mut self, _client: &ApiClient) -> Result<Payload, ResourceError> {
        let name = random_string(10, CharClass::Lower);
        let password = random_string(10, CharClass::All);
        Ok(payload_of(json!({
            "name": format!("test_{name}"),
            "user_name": format!("test_{name}"),
            "password": password,
            "password_confirmation": password,
            "type": pick(&USER_TYPES).copied().unwrap_or(USER_TYPES[0]),
            "country": random_country().display_name(),
            "email": format!("{name}@botrista.com"),
            "status": "active",
            "prefer_unit": pick(&USER_UNITS).copied().unwrap_or(USER_UNITS[0]),
            "adjust_to_cup_size": true,
            "subscribe": true,
            "alert_mute": true,
        })))
    }

    fn after_create(&mut self) {
        for field in SECRET_FIELDS {
            self.state.info_data.remove(field);
        }
    }

    fn prepare_update_payload(&mut self, _client: &ApiClient) -> Result<Payload, ResourceError> {
        Ok(payload_of(json!({
            "name": random_string(10, CharClass::Lower),
            "type": pick(&USER_TYPES).copied().unwrap_or(USER_TYPES[0]),
            "country": random_country().display_name(),
            "prefer_unit": pick(&USER_UNITS).copied().unwrap_or(USER_UNITS[0]),
            "adjust_to_cup_size": random_bool(),
            "subscribe": random_bool(),
            "alert_mute": random_bool(),
        })))
    }

    fn execute_update(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let body = Value::Object(self.state.update_payload.clone());
        send_json(client, ApiPath::UserUpdate, &[("user_name", id.as_str())], Method::Put, body)
    }

    fn delete(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let body = json!({"status": INACTIVE_STATUS});
        send_json(client, ApiPath::UserUpdate, &[("user_name", id.as_str())], Method::Put, body)
    }
}
