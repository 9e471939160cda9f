// crates/cloudbar-resources/src/endpoints/corporation.rs
// ============================================================================
// Module: Corporation Endpoint
// Description: Headquarter accounts that own locations.
// Purpose: Create, update, and deactivate corporations.
// Dependencies: cloudbar-client, serde_json
// ============================================================================

//! ## Overview
//! Corporations are users of type `Headquarter`. Detail reads go through the
//! user detail endpoint, declared on the kind descriptor; updates and the
//! soft delete go through the corporation detail endpoint.

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
use crate::endpoint::default_document;
use crate::endpoint::payload_of;
use crate::endpoint::send_json;
use crate::error::ResourceError;
use crate::kind::INACTIVE_STATUS;
use crate::kind::ResourceKind;
use crate::random::CharClass;
use crate::random::random_bool;
use crate::random::random_country;
use crate::random::random_string;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default create document.
const CREATE_DOCUMENT: &str = include_str!("../../res/create_data/create_corporation.json");
/// Account type of every corporation.
pub const CORPORATION_TYPE: &str = "Headquarter";
/// Address appended to `multi_email` on update.
const EXTRA_EMAIL: &str = "example3@mail.com";

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Corporation lifecycle.
#[derive(Debug, Clone, Default)]
pub struct Corporation {
    /// Lifecycle state.
    state: ResourceState,
}

impl Corporation {
    /// Creates an endpoint with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResourceEndpoint for Corporation {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Corporation
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn prepare_create_payload(&mut self, _client: &ApiClient) -> Result<Payload, ResourceError> {
        let mut payload = default_document(ResourceKind::Corporation, CREATE_DOCUMENT)?;
        let user_name = random_string(10, CharClass::Lower);
        payload.extend(payload_of(json!({
            "name": format!("test_{user_name}"),
            "user_name": format!("test_{user_name}"),
            "type": CORPORATION_TYPE,
            "country": random_country().display_name(),
            "email": format!("{user_name}@botrista.com"),
            "phone_number": random_string(10, CharClass::Number),
            "owner_name": random_string(10, CharClass::Lower),
            "location_prefix": random_string(5, CharClass::Upper),
        })));
        Ok(payload)
    }

    fn prepare_update_payload(&mut self, _client: &ApiClient) -> Result<Payload, ResourceError> {
        let name = random_string(10, CharClass::Lower);
        let mut multi_email = match self.state.info_data.get("multi_email") {
            Some(Value::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        multi_email.push(json!(EXTRA_EMAIL));
        Ok(payload_of(json!({
            "name": name,
            "email": format!("{name}@botrista.com"),
            "phone_number": random_string(10, CharClass::Number),
            "owner_name": random_string(10, CharClass::Lower),
            "adjust_to_cup_size": random_bool(),
            "subscribe": random_bool(),
            "subscribe_daily": random_bool(),
            "account_manager": "qatestingfae",
            "order_term": "Net 15",
            "multi_email": multi_email,
            "subscribe_sales": random_bool(),
            "subscribe_weekly": random_bool(),
            "alert_mute": random_bool(),
            "contract_status": "Demo",
            "company_logo": "https://www.example.com/logo2.png",
            "screen_saver": "https://www.example.com/screen_saver2.png",
        })))
    }

    fn execute_update(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let body = Value::Object(self.state.update_payload.clone());
        send_json(client, ApiPath::CorpDetail, &[("user_name", id.as_str())], Method::Put, body)
    }

    fn delete(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let body = json!({"status": INACTIVE_STATUS});
        send_json(client, ApiPath::CorpDetail, &[("user_name", id.as_str())], Method::Put, body)
    }
}
