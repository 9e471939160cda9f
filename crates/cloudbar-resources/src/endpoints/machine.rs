// crates/cloudbar-resources/src/endpoints/machine.rs
// ============================================================================
// Module: Machine Endpoint
// Description: Dispensing machines imported, registered, and edited.
// Purpose: Drive the machine lifecycle and machine-signed login.
// Dependencies: cloudbar-client, k256, hex, serde_json, time
// ============================================================================

//! ## Overview
//! Creating a machine is three calls: factory import, key registration, and
//! an edit that names the machine. The edit payload becomes the create
//! payload of record. The secp256k1 signing key lives on the instance and
//! signs machine logins.
//!
//! Invariants:
//! - The serial number is generated locally and is the natural key.
//! - Delete returns the machine to the platform owner before removing it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use cloudbar_client::ApiClient;
use cloudbar_client::ApiPath;
use cloudbar_client::ApiResponse;
use cloudbar_client::Method;
use k256::ecdsa::Signature;
use k256::ecdsa::SigningKey;
use k256::ecdsa::signature::Signer;
use k256::pkcs8::EncodePublicKey;
use k256::pkcs8::LineEnding;
use rand::rngs::OsRng;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use tracing::info;

use crate::endpoint::Payload;
use crate::endpoint::ResourceEndpoint;
use crate::endpoint::ResourceState;
use crate::endpoint::payload_of;
use crate::endpoint::send_empty;
use crate::endpoint::send_json;
use crate::endpoint::string_at;
use crate::error::ResourceError;
use crate::kind::ResourceKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Account that owns unassigned machines.
pub const PLATFORM_OWNER: &str = "botrista_machines";
/// Serial number prefix of test machines.
const SERIAL_PREFIX: &str = "db0xqatesting";
/// Hardware revision reported at import.
const HARDWARE_VERSION: &str = "4.5A";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Tokens returned by a machine login.
#[derive(Clone, PartialEq, Eq)]
pub struct MachineTokens {
    /// Bearer for machine-token calls.
    pub access_token: String,
    /// Token used to refresh the bearer.
    pub refresh_token: String,
}

impl fmt::Debug for MachineTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineTokens").finish_non_exhaustive()
    }
}

/// Machine lifecycle.
#[derive(Clone, Default)]
pub struct Machine {
    /// Lifecycle state.
    state: ResourceState,
    /// Numeric machine id, also the serial suffix.
    machine_id: String,
    /// Serial number.
    serial_num: String,
    /// SPKI PEM of the registered public key.
    public_key: String,
    /// Private key of the registered pair.
    signing_key: Option<SigningKey>,
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("serial_num", &self.serial_num)
            .field("has_key", &self.signing_key.is_some())
            .finish_non_exhaustive()
    }
}

impl Machine {
    /// Creates an endpoint with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the serial number; empty before create.
    #[must_use]
    pub fn serial_num(&self) -> &str {
        &self.serial_num
    }

    /// Returns the registered public key in SPKI PEM; empty before create.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Signs `message` with the machine key: SHA-256 ECDSA, DER, hex.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Key`] when no key has been generated.
    pub fn sign(&self, message: &str) -> Result<String, ResourceError> {
        let key = self
            .signing_key
            .as_ref()
            .ok_or_else(|| ResourceError::Key("machine has no signing key".to_string()))?;
        let signature: Signature = key.sign(message.as_bytes());
        Ok(hex::encode(signature.to_der().as_bytes()))
    }

    /// Logs in as the machine with a signed timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] before create, on a signing failure, or when
    /// the login call fails.
    pub fn machine_token(&self, client: &ApiClient) -> Result<MachineTokens, ResourceError> {
        let serial = self.require_id()?;
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let verify = format!("{serial}-{millis}");
        let body = json!({
            "serial_num": serial,
            "verify": verify,
            "signature": self.sign(&verify)?,
        });
        let response = send_json(client, ApiPath::MachineLogin, &[], Method::Post, body)?;
        Ok(MachineTokens {
            access_token: string_at(ResourceKind::Machine, &response, "/data/accessToken")?,
            refresh_token: string_at(ResourceKind::Machine, &response, "/data/refreshToken")?,
        })
    }

    /// Installs the machine at a location.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] before create or when the transfer fails.
    pub fn install_to_location(
        &self,
        client: &ApiClient,
        location_code: &str,
    ) -> Result<ApiResponse, ResourceError> {
        let serial = self.require_id()?;
        let body = json!({
            "action": "Install",
            "location_code": location_code,
            "serial_num": serial,
        });
        send_json(client, ApiPath::MachineTransfer, &[], Method::Post, body)
    }

    /// Generates a fresh key pair and returns the public half as SPKI PEM.
    fn generate_key_pair(&mut self) -> Result<String, ResourceError> {
        let key = SigningKey::random(&mut OsRng);
        let pem = key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|err| ResourceError::Key(err.to_string()))?;
        self.signing_key = Some(key);
        self.public_key.clone_from(&pem);
        Ok(pem)
    }

    /// Returns the edit payload that names the machine.
    fn edit_payload(&self) -> Payload {
        payload_of(json!({
            "name": format!("qatesting-{}", self.machine_id),
            "serial_num": self.serial_num,
            "machine_id": self.machine_id,
            "drinkable_hot_water": true,
            "sparkling_water": true,
            "alert_mute": true,
            "auto_ratio": true,
            "is_reverse_pump_enabled": true,
            "is_adaptive_dispense_enabled": true,
        }))
    }
}

impl ResourceEndpoint for Machine {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Machine
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    fn prepare_create_payload(&mut self, _client: &ApiClient) -> Result<Payload, ResourceError> {
        self.machine_id = OffsetDateTime::now_utc().unix_timestamp().to_string();
        self.serial_num = format!("{SERIAL_PREFIX}{}", self.machine_id);
        let public_key = self.generate_key_pair()?;
        Ok(payload_of(json!({
            "machine_import_data": {
                "csv": [{
                    "serial_num": self.serial_num,
                    "machine_id": self.machine_id,
                    "hardware_version": HARDWARE_VERSION,
                }],
            },
            "machine_register_data": {
                "serial_num": self.serial_num,
                "public_key": public_key,
            },
        })))
    }

    fn execute_create(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        for (path, section) in [
            (ApiPath::MachineImport, "machine_import_data"),
            (ApiPath::MachineRegister, "machine_register_data"),
        ] {
            let body = self.state.create_payload.get(section).cloned().ok_or_else(|| {
                ResourceError::payload(ResourceKind::Machine, format!("missing {section}"))
            })?;
            send_json(client, path, &[], Method::Post, body)?;
        }
        self.state.create_payload = self.edit_payload();
        let body = Value::Object(self.state.create_payload.clone());
        send_json(client, ApiPath::MachineEdit, &[], Method::Patch, body)
    }

    fn extract_identity(&self, _response: &ApiResponse) -> Result<String, ResourceError> {
        Ok(self.serial_num.clone())
    }

    fn prepare_update_payload(&mut self, _client: &ApiClient) -> Result<Payload, ResourceError> {
        Ok(payload_of(json!({
            "name": format!("qatesting-{}", self.machine_id),
            "serial_num": self.serial_num,
            "machine_id": self.machine_id,
        })))
    }

    fn execute_update(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let body = Value::Object(self.state.update_payload.clone());
        send_json(client, ApiPath::MachineEdit, &[], Method::Patch, body)
    }

    fn delete(&mut self, client: &ApiClient) -> Result<ApiResponse, ResourceError> {
        let serial = self.require_id()?;
        let params = [("serial_num", serial.as_str())];
        let detail = send_empty(client, ApiPath::MachineDetail, &params, Method::Get)?;
        let owner = string_at(ResourceKind::Machine, &detail, "/data/user_name")?;
        if owner != PLATFORM_OWNER {
            info!(serial_num = %serial, owner = %owner, "returning machine before delete");
            let body = json!({"action": "Return", "serial_num": serial});
            send_json(client, ApiPath::MachineTransfer, &[], Method::Post, body)?;
        }
        send_empty(client, ApiPath::MachineDelete, &params, Method::Delete)
    }
}
