// crates/cloudbar-resources/tests/common/mod.rs
// ============================================================================
// Module: Fake Backend
// Description: Stateful in-process CloudBar backend for lifecycle tests.
// Purpose: Serve login, CRUD, pump, batch, transfer, and schema routes.
// Dependencies: tiny_http, k256, serde_json, url, tempfile
// ============================================================================

//! ## Overview
//! [`FakeBackend`] runs a `tiny_http` server on a background thread. Records
//! live in memory per collection and every request is captured for
//! assertions. Corporations are stored with users, as the real backend
//! serves both through the user detail endpoint.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use cloudbar_client::ApiClient;
use cloudbar_client::ClientConfig;
use cloudbar_client::Credentials;
use k256::ecdsa::Signature;
use k256::ecdsa::VerifyingKey;
use k256::ecdsa::signature::Verifier;
use k256::pkcs8::DecodePublicKey;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Owner of unassigned machines.
pub const PLATFORM_OWNER: &str = "botrista_machines";
/// Owner recorded when a machine is installed.
pub const INSTALLED_OWNER: &str = "qa_location_owner";

/// Request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: Value,
}

impl Recorded {
    /// Returns every value of a query parameter.
    pub fn query_values(&self, name: &str) -> Vec<&str> {
        self.query.iter().filter(|(key, _)| key == name).map(|(_, value)| value.as_str()).collect()
    }
}

/// In-memory collections.
#[derive(Debug, Default)]
pub struct BackendState {
    pub locations: BTreeMap<String, Value>,
    pub users: BTreeMap<String, Value>,
    pub machines: BTreeMap<String, Value>,
    pub flavors: BTreeMap<String, Value>,
    pub drinks: BTreeMap<String, Value>,
    pub menus: BTreeMap<String, Value>,
    pub assignments: Vec<Value>,
    pub requests: Vec<Recorded>,
    pub pump_catalog: Vec<Value>,
    pub reject_register: bool,
    next_id: u64,
}

impl BackendState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{:04}", self.next_id)
    }
}

/// Handle for the fake backend server.
pub struct FakeBackend {
    host: String,
    state: Arc<Mutex<BackendState>>,
    stop: Arc<AtomicBool>,
    join: Option<thread::JoinHandle<()>>,
    schema_dir: TempDir,
}

impl FakeBackend {
    /// Starts a backend seeded with reference data.
    pub fn start() -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let state = Arc::new(Mutex::new(BackendState {
            pump_catalog: pump_catalog(),
            ..BackendState::default()
        }));
        let stop = Arc::new(AtomicBool::new(false));
        let join = {
            let state = Arc::clone(&state);
            let stop = Arc::clone(&stop);
            thread::spawn(move || serve(&server, &state, &stop))
        };
        Self {
            host: format!("http://{addr}"),
            state,
            stop,
            join: Some(join),
            schema_dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Returns a logged-in client whose schema cache is private to this backend.
    pub fn client(&self) -> ApiClient {
        let mut config = ClientConfig::new(&self.host);
        config.credentials = Some(Credentials {
            user_name: "qa_user".to_string(),
            password: "secret".to_string(),
        });
        config.timeout = Duration::from_secs(10);
        config.schema_path = self.schema_dir.path().join("swagger.json");
        ApiClient::new(config).unwrap()
    }

    /// Runs `f` against the backend state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    /// Returns captured requests, logins excluded.
    pub fn requests(&self) -> Vec<Recorded> {
        self.with_state(|state| {
            state.requests.iter().filter(|request| request.path != "/login").cloned().collect()
        })
    }

    /// Returns captured requests matching a method and path.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn serve(server: &Server, state: &Mutex<BackendState>, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        let mut request = match server.recv_timeout(Duration::from_millis(20)) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(_) => break,
        };
        let mut text = String::new();
        let _ = request.as_reader().read_to_string(&mut text);
        let (path, query) = match request.url().split_once('?') {
            Some((path, query)) => (
                path.to_string(),
                url::form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
            ),
            None => (request.url().to_string(), Vec::new()),
        };
        let recorded = Recorded {
            method: request.method().to_string(),
            path,
            query,
            authorization: request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.to_string()),
            body: serde_json::from_str(&text).unwrap_or(Value::Null),
        };
        let (status, payload) = {
            let mut guard = state.lock().unwrap();
            guard.requests.push(recorded.clone());
            route(&mut guard, &recorded)
        };
        let header = Header::from_bytes("Content-Type", "application/json").unwrap();
        let _ = request.respond(
            Response::from_string(payload.to_string()).with_status_code(status).with_header(header),
        );
    }
}

// ============================================================================
// SECTION: Routes
// ============================================================================

fn ok(data: Value) -> (u16, Value) {
    (200, json!({"data": data}))
}

fn not_found() -> (u16, Value) {
    (404, json!({"message": "not found"}))
}

fn object(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn merge(record: &mut Value, update: &Value) {
    if let (Some(target), Some(source)) = (record.as_object_mut(), update.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn listing(key: &str, records: &BTreeMap<String, Value>, request: &Recorded) -> (u16, Value) {
    let amount = request
        .query_values("amount")
        .first()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(records.len());
    let mut data = Map::new();
    data.insert("total".to_string(), json!(records.len()));
    data.insert(key.to_string(), records.values().take(amount).cloned().collect());
    ok(Value::Object(data))
}

fn route(state: &mut BackendState, request: &Recorded) -> (u16, Value) {
    let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
    let body = &request.body;
    match (request.method.as_str(), segments.as_slice()) {
        ("POST", ["login"]) => ok(json!({"accessToken": "user-token", "refreshToken": "r"})),
        ("GET", ["swagger.json"]) => (200, schema_document()),
        ("GET", ["machine-channels"]) => ok(json!([{"name": "stable", "version": "1.0.0"}])),

        ("GET", ["locations"]) => listing("locations", &state.locations, request),
        ("POST", ["locations"]) => {
            let code = state.next("LOC");
            let mut record = object(body);
            record.insert("full_code".to_string(), json!(code));
            record.insert("status".to_string(), json!("active"));
            state.locations.insert(code, Value::Object(record.clone()));
            ok(Value::Object(record))
        }
        ("GET", ["locations", code, "drink-settings"]) => {
            if !state.locations.contains_key(*code) {
                return not_found();
            }
            let menu = request.query_values("menu_id").first().map(|id| (*id).to_string());
            let drinks = menu
                .and_then(|id| state.menus.get(&id))
                .and_then(|menu| menu.get("drinks").cloned())
                .unwrap_or_else(|| json!([]));
            ok(json!({"full_code": code, "drinks": drinks}))
        }
        ("GET", ["locations", code]) => {
            state.locations.get(*code).cloned().map_or_else(not_found, ok)
        }
        ("PATCH", ["locations", code]) => match state.locations.get_mut(*code) {
            Some(record) => {
                merge(record, body);
                ok(record.clone())
            }
            None => not_found(),
        },
        ("DELETE", ["locations", code]) => {
            state.locations.remove(*code).map_or_else(not_found, |_| ok(json!({})))
        }

        ("GET", ["users"]) => ok(Value::Array(state.users.values().cloned().collect())),
        ("POST", ["users" | "corporations"]) => {
            let mut record = object(body);
            record.remove("password");
            record.remove("password_confirmation");
            record.entry("status").or_insert(json!("active"));
            let user_name = record.get("user_name").and_then(Value::as_str).unwrap_or_default();
            state.users.insert(user_name.to_string(), Value::Object(record.clone()));
            ok(Value::Object(record))
        }
        ("PUT", ["users" | "corporations", user_name]) => match state.users.get_mut(*user_name) {
            Some(record) => {
                merge(record, body);
                ok(record.clone())
            }
            None => not_found(),
        },
        ("GET", ["user", "type", user_type]) => ok(Value::Array(
            state
                .users
                .values()
                .filter(|user| user.get("type").and_then(Value::as_str) == Some(*user_type))
                .cloned()
                .collect(),
        )),
        ("GET", ["user", user_name]) => {
            state.users.get(*user_name).cloned().map_or_else(not_found, ok)
        }

        ("GET", ["machines"]) => ok(Value::Array(state.machines.values().cloned().collect())),
        ("POST", ["user", "machine", "import", "factory"]) => {
            for row in body.get("csv").and_then(Value::as_array).into_iter().flatten() {
                let mut record = object(row);
                record.insert("user_name".to_string(), json!(PLATFORM_OWNER));
                let serial = record.get("serial_num").and_then(Value::as_str).unwrap_or_default();
                state.machines.insert(serial.to_string(), Value::Object(record.clone()));
            }
            ok(json!({}))
        }
        ("POST", ["machine", "register"]) if state.reject_register => {
            (400, json!({"message": "register rejected"}))
        }
        ("POST", ["machine", "register"]) => {
            let serial = body.get("serial_num").and_then(Value::as_str).unwrap_or_default();
            match state.machines.get_mut(serial) {
                Some(record) => {
                    merge(record, &json!({"public_key": body.get("public_key")}));
                    ok(json!({}))
                }
                None => (400, json!({"message": "unknown serial"})),
            }
        }
        ("PATCH", ["user", "machine", "edit"]) => {
            let serial = body.get("serial_num").and_then(Value::as_str).unwrap_or_default();
            match state.machines.get_mut(serial) {
                Some(record) => {
                    merge(record, body);
                    ok(record.clone())
                }
                None => not_found(),
            }
        }
        ("GET", ["machines", serial]) => {
            state.machines.get(*serial).cloned().map_or_else(not_found, ok)
        }
        ("POST", ["user", "machine", "transfer"]) => {
            let serial = body.get("serial_num").and_then(Value::as_str).unwrap_or_default();
            let Some(record) = state.machines.get_mut(serial) else {
                return not_found();
            };
            match body.get("action").and_then(Value::as_str) {
                Some("Install") => merge(
                    record,
                    &json!({"user_name": INSTALLED_OWNER, "location_code": body.get("location_code")}),
                ),
                Some("Return") => {
                    merge(record, &json!({"user_name": PLATFORM_OWNER, "location_code": null}));
                }
                _ => return (400, json!({"message": "unknown action"})),
            }
            ok(record.clone())
        }
        ("DELETE", ["internal", "machines", serial]) => {
            match state.machines.get(*serial).and_then(|m| m.get("user_name").cloned()) {
                Some(owner) if owner == json!(PLATFORM_OWNER) => {
                    state.machines.remove(*serial);
                    ok(json!({}))
                }
                Some(_) => (400, json!({"message": "machine is installed"})),
                None => not_found(),
            }
        }
        ("POST", ["machine", "login"]) => machine_login(state, body),

        ("GET", ["ref", "flavor_class_type"]) => ok(json!([
            {"key": "FIL", "value": "Filter"},
            {"key": "SYR", "value": "Syrup"},
            {"key": "PUR", "value": "Puree"},
        ])),
        ("GET", ["flavor-vendors"]) => ok(json!([
            {"code": "V001", "name": "Acme Syrups", "abbr": "ACM", "country": "United States"},
        ])),
        ("GET", ["flavors"]) => listing("flavors", &state.flavors, request),
        ("POST", ["flavors"]) => {
            let mut record = object(body);
            let sku = record.get("sku").and_then(Value::as_str).unwrap_or_default().to_string();
            let full_sku = format!("FL-{sku}");
            record.insert("sku".to_string(), json!(full_sku));
            record.insert("full_sku".to_string(), json!(full_sku));
            state.flavors.insert(full_sku, Value::Object(record.clone()));
            ok(Value::Object(record))
        }
        ("GET", ["flavors", sku]) => state.flavors.get(*sku).cloned().map_or_else(not_found, ok),
        ("PUT", ["flavors", sku]) => match state.flavors.get_mut(*sku) {
            Some(record) => {
                merge(record, body);
                ok(record.clone())
            }
            None => not_found(),
        },
        ("DELETE", ["flavors", sku]) => {
            state.flavors.remove(*sku).map_or_else(not_found, |_| ok(json!({})))
        }

        ("GET", ["drink-categories"]) => ok(json!([
            {"_id": "cat-tea", "name": "Tea"},
            {"_id": "cat-soda", "name": "Soda"},
        ])),
        ("GET", ["drinks"]) => listing("drinks", &state.drinks, request),
        ("POST", ["drinks"]) => {
            let record = nest_category(object(body));
            let sku = record.get("sku").and_then(Value::as_str).unwrap_or_default().to_string();
            state.drinks.insert(sku, Value::Object(record.clone()));
            ok(Value::Object(record))
        }
        ("GET", ["drinks", sku]) => state.drinks.get(*sku).cloned().map_or_else(not_found, ok),
        ("PUT", ["drinks", sku]) => match state.drinks.get_mut(*sku) {
            Some(record) => {
                merge(record, body);
                let nested = nest_category(object(record));
                *record = Value::Object(nested);
                ok(record.clone())
            }
            None => not_found(),
        },
        ("DELETE", ["internal", "drinks", sku]) => {
            state.drinks.remove(*sku).map_or_else(not_found, |_| ok(json!({})))
        }

        ("POST", ["menu", "pump"]) => {
            let chosen: Vec<Value> =
                body.get("sku").and_then(Value::as_array).cloned().unwrap_or_default();
            let available: Vec<Value> = state
                .pump_catalog
                .iter()
                .filter(|drink| !drink.get("sku").is_some_and(|sku| chosen.contains(sku)))
                .cloned()
                .collect();
            ok(json!({"available": available}))
        }
        ("GET", ["menus"]) => listing("menus", &state.menus, request),
        ("POST", ["menus"]) => {
            let id = state.next("menu-");
            let mut record = object(body);
            record.insert("_id".to_string(), json!(id));
            record.insert("status".to_string(), json!("active"));
            let expanded = expand_drinks(&state.pump_catalog, body.get("drinks"));
            record.insert("drinks".to_string(), expanded);
            state.menus.insert(id.clone(), Value::Object(record));
            ok(json!({"id": id}))
        }
        ("GET", ["menus", id]) => state.menus.get(*id).cloned().map_or_else(not_found, ok),
        ("PUT", ["menus", id]) => {
            let expanded = expand_drinks(&state.pump_catalog, body.get("drinks"));
            match state.menus.get_mut(*id) {
                Some(record) => {
                    merge(record, &json!({"drinks": expanded}));
                    ok(record.clone())
                }
                None => not_found(),
            }
        }
        ("DELETE", ["menus", id]) => state.menus.remove(*id).map_or_else(not_found, |_| ok(json!({}))),
        ("POST", ["menu", "batch"]) => {
            state.assignments.push(body.clone());
            ok(json!({}))
        }

        _ => (500, json!({"message": "unrouted"})),
    }
}

fn nest_category(mut record: Map<String, Value>) -> Map<String, Value> {
    if let Some(id) = record.remove("drink_category_id") {
        record.insert("drink_category".to_string(), json!({"_id": id, "name": "Category"}));
    }
    record
}

fn expand_drinks(catalog: &[Value], skus: Option<&Value>) -> Value {
    let skus = skus.and_then(Value::as_array).cloned().unwrap_or_default();
    Value::Array(
        skus.iter()
            .filter_map(|sku| catalog.iter().find(|drink| drink.get("sku") == Some(sku)).cloned())
            .collect(),
    )
}

fn machine_login(state: &BackendState, body: &Value) -> (u16, Value) {
    let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or_default();
    let Some(pem) =
        state.machines.get(field("serial_num")).and_then(|m| m.get("public_key")?.as_str())
    else {
        return (401, json!({"message": "unknown machine"}));
    };
    let verified = VerifyingKey::from_public_key_pem(pem).ok().is_some_and(|key| {
        hex::decode(field("signature"))
            .ok()
            .and_then(|der| Signature::from_der(&der).ok())
            .is_some_and(|signature| key.verify(field("verify").as_bytes(), &signature).is_ok())
    });
    if verified && field("verify").starts_with(&format!("{}-", field("serial_num"))) {
        ok(json!({"accessToken": "machine-token", "refreshToken": "machine-refresh"}))
    } else {
        (401, json!({"message": "bad signature"}))
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn pump_catalog() -> Vec<Value> {
    ["DR-1001", "DR-1002", "DR-1003"]
        .iter()
        .map(|sku| {
            json!({
                "sku": sku,
                "name": format!("Drink {sku}"),
                "country": "United States",
                "date_modified": "2024-01-01T00:00:00.000Z",
                "description": "house drink",
                "ingredient": [],
                "flavor": [],
                "status": "active",
                "photo": "https://www.example.com/drink.png",
                "item_type": "9",
            })
        })
        .collect()
}

/// Minimal schema document covering the operations the suites check.
pub fn schema_document() -> Value {
    let fields = |names: &[&str]| {
        json!([{
            "name": "fields",
            "in": "query",
            "schema": {"type": "array", "items": {"type": "string", "enum": names}},
        }])
    };
    let envelope = |data: Value| {
        json!({"200": {"content": {"application/json": {"schema": {
            "type": "object",
            "properties": {"data": data},
        }}}}})
    };
    json!({
        "openapi": "3.0.3",
        "paths": {
            "/locations": {
                "get": {"responses": envelope(json!({
                    "type": "object",
                    "properties": {
                        "total": {"type": "integer"},
                        "locations": {"type": "array", "items": {"$ref": "#/components/schemas/Location"}},
                    },
                }))},
                "post": {"responses": envelope(json!({"$ref": "#/components/schemas/Location"}))},
            },
            "/locations/{full_code}": {
                "get": {
                    "parameters": fields(&["name", "city", "full_code"]),
                    "responses": envelope(json!({"$ref": "#/components/schemas/Location"})),
                },
            },
            "/locations/{full_code}/drink-settings": {
                "get": {"responses": envelope(json!({
                    "type": "object",
                    "properties": {
                        "full_code": {"type": "string"},
                        "drinks": {"type": "array", "items": {"type": "object"}},
                    },
                }))},
            },
            "/menus": {
                "get": {
                    "parameters": fields(&["name", "drinks"]),
                    "responses": envelope(json!({"type": "object"})),
                },
            },
            "/machine-channels": {
                "get": {"responses": envelope(json!({
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}, "version": {"type": "string"}},
                    },
                }))},
            },
        },
        "components": {"schemas": {
            "Location": {
                "type": "object",
                "properties": {
                    "full_code": {"type": "string"},
                    "name": {"type": "string"},
                    "city": {"type": "string"},
                    "launch_time": {"type": "string", "format": "date-time", "nullable": true},
                },
            },
        }},
    })
}
