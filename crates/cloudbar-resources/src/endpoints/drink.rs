// crates/cloudbar-resources/src/endpoints/drink.rs
// ============================================================================
// Module: Drink Endpoint
// Description: Drink recipes built from existing flavors.
// Purpose: Create, update, and hard-delete drinks.
// Dependencies: cloudbar-client, rand, serde_json
// ============================================================================

//! ## Overview
//! A drink carries two formulas (sugar levels 100 and 50) over three flavors
//! drawn with replacement from the active flavor list. The detail endpoint
//! returns the category as `drink_category._id`, so the flat
//! `drink_category_id` sent is remapped after every write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cloudbar_client::ApiClient;
use cloudbar_client::ApiPath;
use cloudbar_client::ApiResponse;
use cloudbar_client::Method;
use rand::seq::SliceRandom;
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
use crate::random::random_bool;
use crate::random::random_country;
use crate::random::random_in;
use crate::random::random_string;

// ============================================================================
// SECTION: Reference Values
// ============================================================================

/// Blender modes with their two permitted durations.
pub const BLENDER_SETTINGS: [(&str, [u64; 2]); 6] = [
    ("HIGH_STANDARD", [1, 10]),
    ("LOW_FOAM", [1, 80]),
    ("SMOOTHIE_STANDARD", [3, 30]),
    ("MILKSHAKE_FINEST", [3, 60]),
    ("PULSE", [1, 1]),
    ("MEDIUM", [3, 60]),
];
/// Sugar levels of the generated formulas, in percent.
const SUGAR_LEVELS: [u64; 2] = [100, 50];
/// Flavors per formula.
const FORMULA_FLAVORS: usize = 3;
/// Item type digits.
const ITEM_TYPES: [&str; 2] = ["8", "9"];
/// Flat category field sent on writes.
const CATEGORY_ID_FIELD: &str = "drink_category_id";

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Drink lifecycle.
#[derive(Debug, Clone, Default)]
pub struct Drink {
    /// Lifecycle state.
    state: ResourceState,
}

impl Drink {
    /// Creates an endpoint with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks a random drink category id.
    fn random_category(client: &ApiClient) -> Result<Value, ResourceError> {
        let response = send_empty(client, ApiPath::DrinkCategory, &[], Method::Get)?;
        let ids: Vec<Value> = array_at(ResourceKind::Drink, &response, "/data")?
            .into_iter()
            .filter_map(|category| category.get("_id").cloned())
            .collect();
        pick(&ids)
            .cloned()
            .ok_or_else(|| ResourceError::payload(ResourceKind::Drink, "no drink categories"))
    }

    /// Builds the sugar-level formulas over three random flavors.
    fn formulas(client: &ApiClient) -> Result<Value, ResourceError> {
        let response = ResourceKind::Flavor.read_list(client)?;
        let flavors = array_at(ResourceKind::Drink, &response, "/data/flavors")?;
        let skus: Vec<Value> =
            flavors.iter().filter_map(|flavor| flavor.get("full_sku").cloned()).collect();
        if skus.is_empty() {
            return Err(ResourceError::payload(ResourceKind::Drink, "no flavors to formulate"));
        }
        let ratios: Vec<(Value, u64)> = (0..FORMULA_FLAVORS)
            .filter_map(|_| pick(&skus).cloned())
            .map(|sku| (sku, random_in(1, 500)))
            .collect();
        Ok(Value::Array(
            SUGAR_LEVELS
                .iter()
                .map(|level| {
                    let scaled: Vec<Value> = ratios
                        .iter()
                        .enumerate()
                        .map(|(index, (sku, volume))| {
                            let volume = if index == 0 { volume * level / 100 } else { *volume };
                            json!({"flavor_sku": sku, "volume_ml": volume})
                        })
                        .collect();
                    json!({"sugar_level": level, "ratios": scaled})
                })
                .collect(),
        ))
    }

    /// Returns a random blender setting object.
    fn blender_setting() -> Value {
        let (mode, durations) = pick(&BLENDER_SETTINGS).copied().unwrap_or(BLENDER_SETTINGS[0]);
        json!({"mode": mode, "duration": pick(&durations).copied().unwrap_or(durations[0])})
    }

    /// Returns both process steps in random order.
    fn process_order() -> Vec<&'static str> {
        let mut steps = vec!["dispense_ingredient", "blending"];
        steps.shuffle(&mut rand::thread_rng());
        steps
    }

    /// Returns two random tags.
    fn drink_tags() -> [String; 2] {
        [random_string(5, CharClass::All), random_string(5, CharClass::All)]
    }

    /// Moves the flat category id into the nested shape the detail returns.
    fn nest_category(&mut self) {
        if let Some(id) = self.state.info_data.remove(CATEGORY_ID_FIELD) {
            self.state.info_data.insert("drink_category".to_string(), json!({"_id": id}));
        }
    }
}

impl ResourceEndpoint for Drink {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Drink
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn prepare_create_payload(&mut self, client: &ApiClient) -> Result<Payload, ResourceError> {
        let item_type = pick(&ITEM_TYPES).copied().unwrap_or(ITEM_TYPES[0]);
        let name = format!("Test_{}", random_string(10, CharClass::Lower));
        let version = random_string(2, CharClass::Number);
        let country = random_country();
        let formulas = Self::formulas(client)?;
        let category = Self::random_category(client)?;
        Ok(payload_of(json!({
            "allow_sparkling": random_bool(),
            "sku": format!("9{item_type}-{name}-{}{version}", country.code()),
            "blender_setting": Self::blender_setting(),
            "country": country.display_name(),
            "description": random_string(10, CharClass::All),
            "drink_tag": Self::drink_tags(),
            "item_type": item_type,
            "name": name,
            "process_order_steps": Self::process_order(),
            "status": "active",
            "version": version,
            "fixed_level": false,
            "drink_category_id": category,
            "formulas": formulas,
        })))
    }

    fn after_create(&mut self) {
        self.nest_category();
    }

    fn prepare_update_payload(&mut self, client: &ApiClient) -> Result<Payload, ResourceError> {
        let category = Self::random_category(client)?;
        let formulas = Self::formulas(client)?;
        Ok(payload_of(json!({
            "blender_setting": Self::blender_setting(),
            "description": random_string(10, CharClass::All),
            "drink_category_id": category,
            "drink_tag": Self::drink_tags(),
            "process_order_steps": Self::process_order(),
            "formulas": formulas,
        })))
    }

    fn execute_update(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let body = Value::Object(self.state.update_payload.clone());
        send_json(client, ApiPath::DrinkDetail, &[("sku", id.as_str())], Method::Put, body)
    }

    fn after_update(&mut self) {
        self.nest_category();
    }

    fn delete(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        send_empty(client, ApiPath::DrinkDelete, &[("sku", id.as_str())], Method::Delete)
    }
}
