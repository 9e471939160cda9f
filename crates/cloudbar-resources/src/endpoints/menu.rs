// crates/cloudbar-resources/src/endpoints/menu.rs
// ============================================================================
// Module: Menu Endpoint
// Description: Drink menus targeted at a machine model.
// Purpose: Compose menus from pump-compatible drinks and assign them.
// Dependencies: cloudbar-client, serde_json
// ============================================================================

//! ## Overview
//! Drinks are chosen through the pump query, which returns the drinks a
//! model can still pour given the skus already selected. Two drinks are
//! chosen per create and per update. The detail endpoint returns full drink
//! records, so the stripped records replace `info_data.drinks` after writes.

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
use crate::endpoint::array_at;
use crate::endpoint::payload_of;
use crate::endpoint::send_empty;
use crate::endpoint::send_json;
use crate::error::ResourceError;
use crate::kind::ResourceKind;
use crate::random::CharClass;
use crate::random::pick;
use crate::random::random_country;
use crate::random::random_string;

// ============================================================================
// SECTION: Reference Values
// ============================================================================

/// Pump capacity of a machine model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpCapacity {
    /// Model name.
    pub model: &'static str,
    /// Refrigerated pumps.
    pub fridge_capacity: u32,
    /// Room-temperature pumps.
    pub room_capacity: u32,
}

/// Supported models and their pumps.
pub const MODEL_PUMPS: [PumpCapacity; 4] = [
    PumpCapacity {
        model: "DrinkBot_Pro-4.1",
        fridge_capacity: 8,
        room_capacity: 2,
    },
    PumpCapacity {
        model: "DrinkBot_Pro-4.6",
        fridge_capacity: 6,
        room_capacity: 6,
    },
    PumpCapacity {
        model: "DrinkBot_Pro-4.x",
        fridge_capacity: 8,
        room_capacity: 4,
    },
    PumpCapacity {
        model: "DrinkBot_Mini-8-0",
        fridge_capacity: 0,
        room_capacity: 8,
    },
];
/// Drink record fields the detail endpoint reports differently.
const STRIPPED_DRINK_FIELDS: [&str; 7] =
    ["country", "date_modified", "description", "ingredient", "flavor", "status", "photo"];
/// Drinks chosen per write.
const DRINKS_PER_WRITE: usize = 2;

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Menu lifecycle.
#[derive(Debug, Clone)]
pub struct Menu {
    /// Lifecycle state.
    state: ResourceState,
    /// Target model, fixed at create.
    pump: PumpCapacity,
    /// Market display name, fixed at create.
    country: String,
    /// Stripped drink records of the last write.
    drinks: Vec<Value>,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            state: ResourceState::default(),
            pump: MODEL_PUMPS[0],
            country: String::new(),
            drinks: Vec::new(),
        }
    }
}

impl Menu {
    /// Creates an endpoint with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns this menu to machines.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] before create or when the call fails.
    pub fn assign_to_machines(
        &self,
        client: &ApiClient,
        serial_nums: &[&str],
    ) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let body = json!({"menu_id": id, "serial_num": serial_nums});
        send_json(client, ApiPath::MenuBatch, &[], Method::Post, body)
    }

    /// Runs one pump query excluding `chosen` skus.
    fn pump_query(&self, client: &ApiClient, chosen: &[Value]) -> Result<Vec<Value>, ResourceError> {
        let body = json!({
            "sku": chosen,
            "filter": {"sku": "", "name": "", "drink_category_id": [], "flavor": []},
            "country": self.country,
            "version": self.pump.model,
            "drink_mode": true,
            "add_on": [],
            "pump": {
                "fridge_capacity": self.pump.fridge_capacity,
                "room_capacity": self.pump.room_capacity,
            },
        });
        let response = send_json(client, ApiPath::MenuPump, &[], Method::Post, body)?;
        array_at(ResourceKind::Menu, &response, "/data/available")
    }

    /// Chooses drinks through successive pump queries.
    ///
    /// Returns the chosen skus and stores the stripped records.
    fn choose_drinks(&mut self, client: &ApiClient) -> Result<Vec<Value>, ResourceError> {
        let mut skus = Vec::with_capacity(DRINKS_PER_WRITE);
        let mut records = Vec::with_capacity(DRINKS_PER_WRITE);
        for _ in 0..DRINKS_PER_WRITE {
            let available = self.pump_query(client, &skus)?;
            let mut drink = pick(&available).cloned().ok_or_else(|| {
                ResourceError::payload(
                    ResourceKind::Menu,
                    format!("no drinks available for {}", self.pump.model),
                )
            })?;
            if let Value::Object(fields) = &mut drink {
                for key in STRIPPED_DRINK_FIELDS {
                    fields.remove(key);
                }
            }
            let sku = drink.get("sku").cloned().ok_or_else(|| {
                ResourceError::payload(ResourceKind::Menu, "available drink has no sku")
            })?;
            skus.push(sku);
            records.push(drink);
        }
        self.drinks = records;
        Ok(skus)
    }

    /// Replaces `info_data.drinks` with the stripped records.
    fn record_drinks(&mut self) {
        self.state.info_data.insert("drinks".to_string(), Value::Array(self.drinks.clone()));
    }
}

impl ResourceEndpoint for Menu {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Menu
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn prepare_create_payload(&mut self, client: &ApiClient) -> Result<Payload, ResourceError> {
        self.pump = pick(&MODEL_PUMPS).copied().unwrap_or(MODEL_PUMPS[0]);
        self.country = random_country().display_name().to_string();
        let skus = self.choose_drinks(client)?;
        Ok(payload_of(json!({
            "name": format!("QATest_Menu_{}", random_string(5, CharClass::Upper)),
            "add_on": [],
            "country": self.country,
            "drinks": skus,
            "target_model": self.pump.model,
        })))
    }

    fn after_create(&mut self) {
        self.record_drinks();
    }

    fn prepare_update_payload(&mut self, client: &ApiClient) -> Result<Payload, ResourceError> {
        let skus = self.choose_drinks(client)?;
        Ok(payload_of(json!({"drinks": skus})))
    }

    fn execute_update(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let body = Value::Object(self.state.update_payload.clone());
        send_json(client, ApiPath::MenuDetail, &[("id", id.as_str())], Method::Put, body)
    }

    fn after_update(&mut self) {
        self.record_drinks();
    }

    fn delete(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        send_empty(client, ApiPath::MenuDetail, &[("id", id.as_str())], Method::Delete)
    }
}
