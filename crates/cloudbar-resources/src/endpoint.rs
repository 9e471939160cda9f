// crates/cloudbar-resources/src/endpoint.rs
// ============================================================================
// Module: Resource Endpoint
// Description: Lifecycle contract shared by every resource kind.
// Purpose: Run create/update as build, send, record, post-process.
// Dependencies: cloudbar-client, serde_json
// ============================================================================

//! ## Overview
//! A [`ResourceEndpoint`] instance tracks one remote record through its
//! lifecycle. The provided [`ResourceEndpoint::create`] and
//! [`ResourceEndpoint::update`] run the shared algorithm; variants supply
//! payload builders, request executors, and post-processing hooks.
//!
//! Invariants:
//! - `resource_id` is set only after a successful create.
//! - `info_data` is the union of every payload sent so far, later keys win.
//! - A failed payload build aborts before any creating call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cloudbar_client::ApiClient;
use cloudbar_client::ApiPath;
use cloudbar_client::ApiResponse;
use cloudbar_client::Method;
use cloudbar_client::RequestOptions;
use cloudbar_client::ResponseCode;
use serde_json::Map;
use serde_json::Value;
use tracing::info;

use crate::error::ResourceError;
use crate::kind::ResourceKind;

// ============================================================================
// SECTION: State
// ============================================================================

/// JSON object payload.
pub type Payload = Map<String, Value>;

/// Mutable lifecycle state of one endpoint instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceState {
    /// Last create payload sent.
    pub create_payload: Payload,
    /// Last update payload sent.
    pub update_payload: Payload,
    /// Expected observable state of the record.
    pub info_data: Payload,
    /// Natural key assigned by the server.
    pub resource_id: Option<String>,
}

// ============================================================================
// SECTION: Endpoint Contract
// ============================================================================

/// Lifecycle of one remote record.
pub trait ResourceEndpoint {
    /// Returns the kind of record managed.
    fn kind(&self) -> ResourceKind;

    /// Returns the lifecycle state.
    fn state(&self) -> &ResourceState;

    /// Returns the lifecycle state mutably.
    fn state_mut(&mut self) -> &mut ResourceState;

    /// Builds the create payload, fetching reference data as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the payload cannot be assembled.
    fn prepare_create_payload(&mut self, client: &ApiClient) -> Result<Payload, ResourceError>;

    /// Sends the creating call(s) for `state().create_payload`.
    ///
    /// The default posts the payload to the descriptor's create endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when a call fails.
    fn execute_create(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let (path, method) = self.kind().descriptor().create;
        send_json(client, path, &[], method, Value::Object(self.state().create_payload.clone()))
    }

    /// Pulls the natural key out of the creation response.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingField`] when the key is absent.
    fn extract_identity(&self, response: &ApiResponse) -> Result<String, ResourceError> {
        let kind = self.kind();
        let pointer = kind.descriptor().identity_pointer.unwrap_or("/data");
        string_at(kind, response, pointer)
    }

    /// Adjusts `info_data` after a successful create.
    fn after_create(&mut self) {}

    /// Builds the update payload.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the payload cannot be assembled.
    fn prepare_update_payload(&mut self, client: &ApiClient) -> Result<Payload, ResourceError>;

    /// Sends the updating call for `state().update_payload`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when the call fails.
    fn execute_update(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError>;

    /// Adjusts `info_data` after a successful update.
    fn after_update(&mut self) {}

    /// Removes the record, hard or soft per the kind.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] when a call fails or the record was never
    /// created.
    fn delete(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError>;

    /// Creates the record and records its identity and expected state.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] from the build, send, or identity steps.
    fn create(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let payload = self.prepare_create_payload(client)?;
        self.state_mut().create_payload = payload;
        let response = self.execute_create(client)?;
        let id = self.extract_identity(&response)?;
        info!(kind = %self.kind(), id = %id, "created resource");
        let state = self.state_mut();
        state.resource_id = Some(id);
        let sent = state.create_payload.clone();
        state.info_data.extend(sent);
        self.after_create();
        Ok(response)
    }

    /// Updates the record and folds the update into the expected state.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotCreated`] before any call when the record
    /// has no identity, or any build or send error.
    fn update(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        self.require_id()?;
        let payload = self.prepare_update_payload(client)?;
        self.state_mut().update_payload = payload;
        let response = self.execute_update(client)?;
        let state = self.state_mut();
        let sent = state.update_payload.clone();
        state.info_data.extend(sent);
        self.after_update();
        Ok(response)
    }

    /// Returns the natural key once created.
    fn resource_id(&self) -> Option<&str> {
        self.state().resource_id.as_deref()
    }

    /// Returns the expected observable state.
    fn info_data(&self) -> &Payload {
        &self.state().info_data
    }

    /// Returns the natural key or [`ResourceError::NotCreated`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotCreated`] before a successful create.
    fn require_id(&self) -> Result<String, ResourceError> {
        self.resource_id().map(str::to_string).ok_or(ResourceError::NotCreated {
            kind: self.kind(),
        })
    }
}

// ============================================================================
// SECTION: Call Helpers
// ============================================================================

/// Sends a JSON body and expects 200.
pub(crate) fn send_json(
    client: &ApiClient,
    path: ApiPath,
    params: &[(&str, &str)],
    method: Method,
    body: Value,
) -> Result<ApiResponse, ResourceError> {
    let resolved = path.resolve_with(params)?;
    Ok(client.call(&resolved, method, ResponseCode::Ok, &RequestOptions::new().json(body))?)
}

/// Sends a bodiless request and expects 200.
pub(crate) fn send_empty(
    client: &ApiClient,
    path: ApiPath,
    params: &[(&str, &str)],
    method: Method,
) -> Result<ApiResponse, ResourceError> {
    let resolved = path.resolve_with(params)?;
    Ok(client.call(&resolved, method, ResponseCode::Ok, &RequestOptions::new())?)
}

/// Returns the string at `pointer` in a JSON response.
pub(crate) fn string_at(
    kind: ResourceKind,
    response: &ApiResponse,
    pointer: &str,
) -> Result<String, ResourceError> {
    match response.json_at(pointer)? {
        Value::String(value) => Ok(value),
        _ => Err(ResourceError::MissingField {
            kind,
            field: pointer.to_string(),
        }),
    }
}

/// Returns the array at `pointer` in a JSON response.
pub(crate) fn array_at(
    kind: ResourceKind,
    response: &ApiResponse,
    pointer: &str,
) -> Result<Vec<Value>, ResourceError> {
    match response.json_at(pointer)? {
        Value::Array(values) => Ok(values),
        _ => Err(ResourceError::MissingField {
            kind,
            field: pointer.to_string(),
        }),
    }
}

/// Unwraps a JSON object literal into a payload; other values yield an
/// empty payload.
pub(crate) fn payload_of(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// Parses an embedded default document into a payload.
pub(crate) fn default_document(kind: ResourceKind, text: &str) -> Result<Payload, ResourceError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        Ok(_) => Err(ResourceError::payload(kind, "default document is not a non-empty object")),
        Err(err) => Err(ResourceError::payload(kind, format!("default document: {err}"))),
    }
}
