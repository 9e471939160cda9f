// crates/cloudbar-resources/src/endpoints/flavor.rs
// ============================================================================
// Module: Flavor Endpoint
// Description: Flavor ingredients supplied by vendors.
// Purpose: Create, rename, and hard-delete flavors.
// Dependencies: cloudbar-client, serde_json
// ============================================================================

//! ## Overview
//! A flavor is created from the default document plus a random class/type
//! pair and vendor drawn from the reference listings. Its `sku` is the
//! natural key.
//! Invariants:
//! - Filter classes are never offered.
//! - Updates rename the flavor from its current expected name.

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
use crate::endpoint::default_document;
use crate::endpoint::payload_of;
use crate::endpoint::send_empty;
use crate::endpoint::send_json;
use crate::error::ResourceError;
use crate::kind::ResourceKind;
use crate::random::CharClass;
use crate::random::pick;
use crate::random::random_string;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default create document.
const CREATE_DOCUMENT: &str = include_str!("../../res/create_data/create_flavor.json");
/// Default update document.
const UPDATE_DOCUMENT: &str = include_str!("../../res/create_data/update_flavor.json");
/// Flavor class never offered to test flavors.
const EXCLUDED_CLASS: &str = "FIL";

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Flavor lifecycle.
#[derive(Debug, Clone, Default)]
pub struct Flavor {
    /// Lifecycle state.
    state: ResourceState,
}

impl Flavor {
    /// Creates an endpoint with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(class, type)` pairs, excluding filters.
    fn class_types(client: &ApiClient) -> Result<Vec<(Value, Value)>, ResourceError> {
        let response = send_empty(client, ApiPath::FlavorClassType, &[], Method::Get)?;
        Ok(array_at(ResourceKind::Flavor, &response, "/data")?
            .into_iter()
            .filter(|item| item.get("key").and_then(Value::as_str) != Some(EXCLUDED_CLASS))
            .filter_map(|item| Some((item.get("key")?.clone(), item.get("value")?.clone())))
            .collect())
    }

    /// Returns vendor records.
    fn vendors(client: &ApiClient) -> Result<Vec<Value>, ResourceError> {
        let response = send_empty(client, ApiPath::FlavorVendors, &[], Method::Get)?;
        array_at(ResourceKind::Flavor, &response, "/data")
    }
}

impl ResourceEndpoint for Flavor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Flavor
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn prepare_create_payload(&mut self, client: &ApiClient) -> Result<Payload, ResourceError> {
        let mut payload = default_document(ResourceKind::Flavor, CREATE_DOCUMENT)?;
        let class_types = Self::class_types(client)?;
        let (class, flavor_type) = pick(&class_types)
            .cloned()
            .ok_or_else(|| ResourceError::payload(ResourceKind::Flavor, "no flavor class types"))?;
        let vendors = Self::vendors(client)?;
        let vendor = pick(&vendors)
            .cloned()
            .ok_or_else(|| ResourceError::payload(ResourceKind::Flavor, "no flavor vendors"))?;
        let field = |name: &str| vendor.get(name).cloned().unwrap_or(Value::Null);
        let sku = random_string(4, CharClass::Upper);
        payload.extend(payload_of(json!({
            "sku": sku,
            "name": format!("Testing-{sku}"),
            "class": class,
            "type": flavor_type,
            "vendor_code": field("code"),
            "vendor": field("name"),
            "vendor_abbr": field("abbr"),
            "country": field("country"),
        })));
        Ok(payload)
    }

    fn after_create(&mut self) {
        self.state.info_data.remove("sku");
    }

    fn prepare_update_payload(&mut self, _client: &ApiClient) -> Result<Payload, ResourceError> {
        let mut payload = default_document(ResourceKind::Flavor, UPDATE_DOCUMENT)?;
        let current = self.state.info_data.get("name").and_then(Value::as_str).unwrap_or_default();
        payload.insert("name".to_string(), json!(format!("TestEdit_{current}")));
        Ok(payload)
    }

    fn execute_update(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        let body = Value::Object(self.state.update_payload.clone());
        send_json(client, ApiPath::FlavorDetail, &[("sku", id.as_str())], Method::Put, body)
    }

    fn delete(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let id = self.require_id()?;
        send_empty(client, ApiPath::FlavorDetail, &[("sku", id.as_str())], Method::Delete)
    }
}
