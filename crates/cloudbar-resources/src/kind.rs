// crates/cloudbar-resources/src/kind.rs
// ============================================================================
// Module: Resource Kinds
// Description: Static descriptors and generic reads per resource kind.
// Purpose: Drive list/detail reads and schema selection from data, not code.
// Dependencies: cloudbar-client, cloudbar-schema, serde_json, tracing
// ============================================================================

//! ## Overview
//! Every resource kind owns one [`ResourceDescriptor`]: its paths, how its
//! list is queried, where its natural key lives, and whether detail reads
//! delegate to another kind. Reads are generic over the descriptor.
//!
//! Invariants:
//! - Detail delegation is declared, never inferred at runtime.
//! - List reads that probe first issue `amount=1`, then the real count.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use cloudbar_client::ApiClient;
use cloudbar_client::ApiPath;
use cloudbar_client::ApiResponse;
use cloudbar_client::Method;
use cloudbar_client::RequestOptions;
use cloudbar_client::ResponseCode;
use cloudbar_schema::ResponseSchema;
use serde_json::Value;
use tracing::warn;

use crate::error::ResourceError;
use crate::random::pick;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Status filter applied to list reads.
const ACTIVE_STATUS: &str = "active";
/// Status reported by soft-deleted records.
pub const INACTIVE_STATUS: &str = "inactive";

// ============================================================================
// SECTION: Descriptor Types
// ============================================================================

/// Resource kinds under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Store location.
    Location,
    /// Platform user.
    User,
    /// Corporation (headquarter account).
    Corporation,
    /// Dispensing machine.
    Machine,
    /// Flavor ingredient.
    Flavor,
    /// Drink recipe.
    Drink,
    /// Drink menu.
    Menu,
}

/// How a kind is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStyle {
    /// The record is physically removed; detail reads return 404.
    Hard,
    /// The record is marked inactive and stays readable.
    Soft,
}

/// Source of the repeated `fields[]` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// No `fields[]` parameters.
    None,
    /// Enum documented on the detail endpoint.
    Detail,
    /// Enum documented on the list endpoint.
    List,
}

/// List query composition, applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// Probe the total item count first and request that many.
    pub probe_total: bool,
    /// `fields[]` source.
    pub fields: FieldSource,
    /// Append `status=active`.
    pub active_only: bool,
}

/// Static per-kind endpoint descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Kind described.
    pub kind: ResourceKind,
    /// Collection endpoint used for list reads.
    pub list_path: ApiPath,
    /// Fixed parameters bound into `list_path`.
    pub list_params: &'static [(&'static str, &'static str)],
    /// Endpoint and method of the final creating call.
    pub create: (ApiPath, Method),
    /// Detail endpoint keyed by the natural key.
    pub detail_path: ApiPath,
    /// Placeholder name of the natural key in `detail_path`.
    pub detail_param: &'static str,
    /// Kind whose detail read serves this kind's detail reads.
    pub detail_delegate: Option<ResourceKind>,
    /// Whether detail reads send detail `fields[]`.
    pub detail_fields: bool,
    /// List query composition.
    pub list_query: ListQuery,
    /// JSON pointer of the record array in list responses.
    pub collection_pointer: &'static str,
    /// Natural key field of list records.
    pub list_key: &'static str,
    /// JSON pointer of the natural key in creation responses.
    pub identity_pointer: Option<&'static str>,
    /// Removal style.
    pub delete_style: DeleteStyle,
}

// ============================================================================
// SECTION: Descriptor Table
// ============================================================================

/// Location descriptor.
const LOCATION: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Location,
    list_path: ApiPath::LocationList,
    list_params: &[],
    create: (ApiPath::LocationList, Method::Post),
    detail_path: ApiPath::LocationDetail,
    detail_param: "full_code",
    detail_delegate: None,
    detail_fields: true,
    list_query: ListQuery {
        probe_total: true,
        fields: FieldSource::Detail,
        active_only: true,
    },
    collection_pointer: "/data/locations",
    list_key: "full_code",
    identity_pointer: Some("/data/full_code"),
    delete_style: DeleteStyle::Hard,
};

/// User descriptor.
const USER: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::User,
    list_path: ApiPath::UserList,
    list_params: &[],
    create: (ApiPath::UserList, Method::Post),
    detail_path: ApiPath::UserDetail,
    detail_param: "user_name",
    detail_delegate: None,
    detail_fields: false,
    list_query: ListQuery {
        probe_total: false,
        fields: FieldSource::List,
        active_only: true,
    },
    collection_pointer: "/data",
    list_key: "user_name",
    identity_pointer: Some("/data/user_name"),
    delete_style: DeleteStyle::Soft,
};

/// Corporation descriptor.
const CORPORATION: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Corporation,
    list_path: ApiPath::UserListByType,
    list_params: &[("type", "Headquarter")],
    create: (ApiPath::CorpList, Method::Post),
    detail_path: ApiPath::CorpDetail,
    detail_param: "user_name",
    detail_delegate: Some(ResourceKind::User),
    detail_fields: false,
    list_query: ListQuery {
        probe_total: false,
        fields: FieldSource::None,
        active_only: false,
    },
    collection_pointer: "/data",
    list_key: "user_name",
    identity_pointer: Some("/data/user_name"),
    delete_style: DeleteStyle::Soft,
};

/// Machine descriptor.
const MACHINE: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Machine,
    list_path: ApiPath::MachineList,
    list_params: &[],
    create: (ApiPath::MachineEdit, Method::Patch),
    detail_path: ApiPath::MachineDetail,
    detail_param: "serial_num",
    detail_delegate: None,
    detail_fields: true,
    list_query: ListQuery {
        probe_total: false,
        fields: FieldSource::List,
        active_only: true,
    },
    collection_pointer: "/data",
    list_key: "serial_num",
    identity_pointer: None,
    delete_style: DeleteStyle::Hard,
};

/// Flavor descriptor.
const FLAVOR: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Flavor,
    list_path: ApiPath::FlavorList,
    list_params: &[],
    create: (ApiPath::FlavorList, Method::Post),
    detail_path: ApiPath::FlavorDetail,
    detail_param: "sku",
    detail_delegate: None,
    detail_fields: false,
    list_query: ListQuery {
        probe_total: true,
        fields: FieldSource::None,
        active_only: true,
    },
    collection_pointer: "/data/flavors",
    list_key: "full_sku",
    identity_pointer: Some("/data/sku"),
    delete_style: DeleteStyle::Hard,
};

/// Drink descriptor.
const DRINK: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Drink,
    list_path: ApiPath::DrinkList,
    list_params: &[],
    create: (ApiPath::DrinkList, Method::Post),
    detail_path: ApiPath::DrinkDetail,
    detail_param: "sku",
    detail_delegate: None,
    detail_fields: true,
    list_query: ListQuery {
        probe_total: true,
        fields: FieldSource::Detail,
        active_only: true,
    },
    collection_pointer: "/data/drinks",
    list_key: "sku",
    identity_pointer: Some("/data/sku"),
    delete_style: DeleteStyle::Hard,
};

/// Menu descriptor.
const MENU: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::Menu,
    list_path: ApiPath::MenuList,
    list_params: &[],
    create: (ApiPath::MenuList, Method::Post),
    detail_path: ApiPath::MenuDetail,
    detail_param: "id",
    detail_delegate: None,
    detail_fields: true,
    list_query: ListQuery {
        probe_total: true,
        fields: FieldSource::List,
        active_only: true,
    },
    collection_pointer: "/data/menus",
    list_key: "_id",
    identity_pointer: Some("/data/id"),
    delete_style: DeleteStyle::Hard,
};

// ============================================================================
// SECTION: Kind Operations
// ============================================================================

impl ResourceKind {
    /// Every kind, in suite order.
    pub const ALL: [Self; 7] = [
        Self::Location,
        Self::User,
        Self::Corporation,
        Self::Machine,
        Self::Flavor,
        Self::Drink,
        Self::Menu,
    ];

    /// Returns the static descriptor.
    #[must_use]
    pub const fn descriptor(self) -> &'static ResourceDescriptor {
        match self {
            Self::Location => &LOCATION,
            Self::User => &USER,
            Self::Corporation => &CORPORATION,
            Self::Machine => &MACHINE,
            Self::Flavor => &FLAVOR,
            Self::Drink => &DRINK,
            Self::Menu => &MENU,
        }
    }

    /// Returns the descriptor that serves detail reads, following delegation.
    #[must_use]
    pub const fn detail_descriptor(self) -> &'static ResourceDescriptor {
        match self.descriptor().detail_delegate {
            Some(delegate) => delegate.descriptor(),
            None => self.descriptor(),
        }
    }

    /// Returns the stable kind name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::User => "User",
            Self::Corporation => "Corporation",
            Self::Machine => "Machine",
            Self::Flavor => "Flavor",
            Self::Drink => "Drink",
            Self::Menu => "Menu",
        }
    }

    /// Returns the removal style.
    #[must_use]
    pub const fn delete_style(self) -> DeleteStyle {
        self.descriptor().delete_style
    }

    /// Schema of a successful list read.
    #[must_use]
    pub fn list_schema(self) -> ResponseSchema {
        self.descriptor().list_path.response_schema(Method::Get, ResponseCode::Ok)
    }

    /// Schema of a successful detail read.
    #[must_use]
    pub fn detail_schema(self) -> ResponseSchema {
        self.detail_descriptor().detail_path.response_schema(Method::Get, ResponseCode::Ok)
    }

    /// Schema of the response to the final creating call.
    #[must_use]
    pub fn create_schema(self) -> ResponseSchema {
        let (path, method) = self.descriptor().create;
        path.response_schema(method, ResponseCode::Ok)
    }

    /// Reads one record by natural key, through the delegate when declared.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the path cannot be resolved or the call
    /// does not return 200.
    pub fn read_detail(self, client: &ApiClient, id: &str) -> Result<ApiResponse, ResourceError> {
        let descriptor = self.detail_descriptor();
        let path = descriptor.detail_path.resolve_with(&[(descriptor.detail_param, id)])?;
        let mut options = RequestOptions::new();
        if descriptor.detail_fields {
            options = options
                .query_all("fields[]", request_fields(client, descriptor.detail_path, Method::Get));
        }
        Ok(client.call(&path, Method::Get, ResponseCode::Ok, &options)?)
    }

    /// Reads the active collection.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the probe or the list call fails.
    pub fn read_list(self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let descriptor = self.descriptor();
        let path = descriptor.list_path.resolve_with(descriptor.list_params)?;
        let query = descriptor.list_query;
        let total = if query.probe_total { Some(self.probe_total(client)?) } else { None };

        let mut options = RequestOptions::new();
        match query.fields {
            FieldSource::None => {}
            FieldSource::Detail => {
                options = options
                    .query_all("fields[]", request_fields(client, descriptor.detail_path, Method::Get));
            }
            FieldSource::List => {
                options = options
                    .query_all("fields[]", request_fields(client, descriptor.list_path, Method::Get));
            }
        }
        if let Some(total) = total {
            options = options.query("amount", total);
        }
        if query.active_only {
            options = options.query("status", ACTIVE_STATUS);
        }
        Ok(client.call(&path, Method::Get, ResponseCode::Ok, &options)?)
    }

    /// Returns the collection size reported by an `amount=1` read.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingField`] when `data.total` is absent.
    pub fn probe_total(self, client: &ApiClient) -> Result<u64, ResourceError> {
        let descriptor = self.descriptor();
        let path = descriptor.list_path.resolve_with(descriptor.list_params)?;
        let options = RequestOptions::new().query("amount", 1);
        let response = client.call(&path, Method::Get, ResponseCode::Ok, &options)?;
        response.json_at("/data/total")?.as_u64().ok_or_else(|| ResourceError::MissingField {
            kind: self,
            field: "/data/total".to_string(),
        })
    }

    /// Picks a random record from the list and returns its natural key.
    ///
    /// Returns `Ok(None)` for an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the list read fails or a record lacks
    /// its key.
    pub fn random_resource_id(self, client: &ApiClient) -> Result<Option<String>, ResourceError> {
        let descriptor = self.descriptor();
        let response = self.read_list(client)?;
        let records = match response.json_at(descriptor.collection_pointer)? {
            Value::Array(records) => records,
            _ => {
                return Err(ResourceError::MissingField {
                    kind: self,
                    field: descriptor.collection_pointer.to_string(),
                });
            }
        };
        let Some(record) = pick(&records) else {
            return Ok(None);
        };
        match record.get(descriptor.list_key) {
            Some(Value::String(id)) => Ok(Some(id.clone())),
            _ => Err(ResourceError::MissingField {
                kind: self,
                field: format!("{}/{}", descriptor.collection_pointer, descriptor.list_key),
            }),
        }
    }

    /// Confirms a deleted record reached its terminal state.
    ///
    /// Hard-deleted records must answer 404; soft-deleted records must read
    /// back with `status == "inactive"`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the confirming call itself fails.
    pub fn confirm_deleted(self, client: &ApiClient, id: &str) -> Result<bool, ResourceError> {
        match self.delete_style() {
            DeleteStyle::Soft => {
                let response = self.read_detail(client, id)?;
                Ok(response.json_at("/data/status")? == Value::String(INACTIVE_STATUS.to_string()))
            }
            DeleteStyle::Hard => {
                let descriptor = self.descriptor();
                let path = descriptor.detail_path.resolve_with(&[(descriptor.detail_param, id)])?;
                let response = client.request(&path, Method::Get, &RequestOptions::new())?;
                Ok(response.status() == ResponseCode::NotFound.as_u16())
            }
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SECTION: Schema Fields
// ============================================================================

/// Returns the documented `fields` enum for an operation.
///
/// A missing schema yields no fields; the read proceeds unfiltered.
pub(crate) fn request_fields(client: &ApiClient, path: ApiPath, method: Method) -> Vec<String> {
    match client.schema_document() {
        Ok(document) => document.request_fields(path.template().as_str(), method.schema_key()),
        Err(err) => {
            warn!(path = %path, error = %err, "schema unavailable; reading without fields");
            Vec::new()
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
