// crates/cloudbar-resources/src/endpoints/location.rs
// ============================================================================
// Module: Location Endpoint
// Description: Store locations owned by a corporation.
// Purpose: Create, patch, and hard-delete locations; read drink settings.
// Dependencies: cloudbar-client, serde_json, time
// ============================================================================

//! ## Overview
//! Locations belong to a corporation user and are keyed by `full_code`.
//! Updates are partial (`PATCH`) and carry millisecond UTC timestamps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cloudbar_client::ApiClient;
use cloudbar_client::ApiPath;
use cloudbar_client::ApiResponse;
use cloudbar_client::Method;
use cloudbar_client::RequestOptions;
use cloudbar_client::ResponseCode;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::endpoint::Payload;
use crate::endpoint::ResourceEndpoint;
use crate::endpoint::ResourceState;
use crate::endpoint::default_document;
use crate::endpoint::payload_of;
use crate::endpoint::send_empty;
use crate::endpoint::send_json;
use crate::error::ResourceError;
use crate::kind::ResourceKind;
use crate::random::CharClass;
use crate::random::random_bool;
use crate::random::random_string;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default create document.
const CREATE_DOCUMENT: &str = include_str!("../../res/create_data/create_location.json");
/// Province sent on create.
const PROVINCE: &str = "NY";

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Store location lifecycle.
#[derive(Debug, Clone)]
pub struct Location {
    /// Lifecycle state.
    state: ResourceState,
    /// Owning corporation user name.
    user_name: String,
}

impl Location {
    /// Creates an endpoint owned by `user_name`.
    #[must_use]
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            state: ResourceState::default(),
            user_name: user_name.into(),
        }
    }

    /// Sets the owning corporation for the next create.
    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        self.user_name = user_name.into();
    }

    /// Reads the drink settings of this location for a menu.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] before create or when the call fails.
    pub fn get_drink_settings(
        &self,
        client: &ApiClient,
        menu_id: &str,
    ) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let path = ApiPath::LocationDrinkSettings.resolve_with(&[("full_code", id.as_str())])?;
        let options = RequestOptions::new().query("menu_id", menu_id);
        Ok(client.call(&path, Method::Get, ResponseCode::Ok, &options)?)
    }
}

impl ResourceEndpoint for Location {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Location
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn prepare_create_payload(&mut self, _client: &ApiClient) -> Result<Payload, ResourceError> {
        let mut payload = default_document(ResourceKind::Location, CREATE_DOCUMENT)?;
        let name = random_string(5, CharClass::Lower);
        let location_name = format!("{name}{}", OffsetDateTime::now_utc().unix_timestamp());
        payload.extend([
            ("city".to_string(), json!(location_name)),
            ("contact_email".to_string(), json!(format!("{name}@gmail.com"))),
            ("contact_name".to_string(), json!(location_name)),
            ("contact_phone".to_string(), json!(random_string(9, CharClass::Number))),
            ("name".to_string(), json!(location_name)),
            ("province".to_string(), json!(PROVINCE)),
            ("store_code".to_string(), json!(random_string(6, CharClass::Number))),
            ("user_name".to_string(), json!(self.user_name)),
            ("zip_code".to_string(), json!(random_string(3, CharClass::Number))),
            ("address".to_string(), json!(random_string(20, CharClass::Letter))),
        ]);
        Ok(payload)
    }

    fn prepare_update_payload(&mut self, _client: &ApiClient) -> Result<Payload, ResourceError> {
        let name = random_string(5, CharClass::Lower);
        let location_name = format!("{name}{}", OffsetDateTime::now_utc().unix_timestamp());
        let timestamp = iso_millis(OffsetDateTime::now_utc())?;
        let multi_email = [
            format!("{}@gmail.com", random_string(5, CharClass::Lower)),
            format!("{}@gmail.com", random_string(5, CharClass::Lower)),
        ];
        Ok(payload_of(json!({
            "name": name,
            "address": random_string(20, CharClass::Letter),
            "city": location_name,
            "contact_email": format!("{name}@gmail.com"),
            "contact_name": location_name,
            "contact_phone": random_string(9, CharClass::Number),
            "filter_program": random_bool(),
            "free_shipping": random_bool(),
            "no_sale_mute": random_bool(),
            "order_bib_system": random_bool(),
            "sell_acce": random_bool(),
            "sell_topping": random_bool(),
            "zip_code": random_string(3, CharClass::Number),
            "subscribe_order": random_bool(),
            "subscribe_sales": random_bool(),
            "multi_email": multi_email,
            "vip": random_bool(),
            "launch_time": timestamp,
            "decommission_time": timestamp,
        })))
    }

    fn execute_update(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let body = Value::Object(self.state.update_payload.clone());
        send_json(client, ApiPath::LocationDetail, &[("full_code", id.as_str())], Method::Patch, body)
    }

    fn delete(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        send_empty(client, ApiPath::LocationDetail, &[("full_code", id.as_str())], Method::Delete)
    }
}

/// Formats a UTC instant as ISO-8601 with milliseconds and a `Z` suffix.
fn iso_millis(instant: OffsetDateTime) -> Result<String, ResourceError> {
    instant
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .map_err(|err| ResourceError::payload(ResourceKind::Location, err.to_string()))
}
