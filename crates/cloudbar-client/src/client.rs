// crates/cloudbar-client/src/client.rs
// ============================================================================
// Module: API Client
// Description: Blocking HTTP transport for the CloudBar backend.
// Purpose: Authenticate, issue calls, and assert response statuses.
// Dependencies: cloudbar-schema, reqwest, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`ApiClient`] wraps a blocking `reqwest` client with the backend host,
//! login credentials, and the schema cache location. Each call logs a
//! curl-style reproduction and the response body at `debug`.
//! Invariants:
//! - Every user-token call logs in again; no bearer is cached.
//! - A status other than the asserted one is an [`ApiError::UnexpectedStatus`]
//!   carrying the response body.
//! - Requests are synchronous and never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use cloudbar_schema::SchemaDocument;
use cloudbar_schema::SchemaError;
use cloudbar_schema::SchemaFetcher;
use cloudbar_schema::SchemaLoader;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http::Method;
use crate::http::ResponseCode;
use crate::paths::ResolvedPath;
use crate::paths::TokenKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default backend host.
pub const DEFAULT_BACKEND_HOST: &str = "https://api.qa.botrista.io";

/// Default schema-serving endpoint.
pub const DEFAULT_SCHEMA_ENDPOINT: &str = "/swagger.json";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Login endpoint.
const LOGIN_PATH: &str = "/login";

/// JSON media type for request and accept headers.
const JSON_MEDIA_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Login credentials for the user principal.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account name.
    pub user_name: String,
    /// Account password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash.
    pub host: String,
    /// User login credentials; user-token calls go unauthenticated without them.
    pub credentials: Option<Credentials>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Cached schema document location.
    pub schema_path: PathBuf,
    /// Schema-serving endpoint used on cache miss.
    pub schema_endpoint: String,
}

impl ClientConfig {
    /// Returns a configuration for `host` with default settings.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            schema_path: PathBuf::from("res/schema/swagger.json"),
            schema_endpoint: DEFAULT_SCHEMA_ENDPOINT.to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_HOST)
    }
}

// ============================================================================
// SECTION: Request Options
// ============================================================================

/// Optional query parameters, body, and headers for one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query pairs in order; names may repeat.
    query: Vec<(String, String)>,
    /// JSON request body.
    body: Option<Value>,
    /// Extra headers.
    headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Returns empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one query pair.
    #[must_use]
    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Appends one pair per value under the same name.
    #[must_use]
    pub fn query_all<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.query.extend(values.into_iter().map(|value| (name.to_string(), value.to_string())));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Returns the query pairs.
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

// ============================================================================
// SECTION: Response
// ============================================================================

/// Completed API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    status: u16,
    /// Raw response body.
    body: String,
}

impl ApiResponse {
    /// Builds a response from parts.
    #[must_use]
    pub const fn new(status: u16, body: String) -> Self {
        Self {
            status,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the raw body.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the body is not JSON.
    pub fn json(&self) -> Result<Value, ApiError> {
        serde_json::from_str(&self.body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Parses the body and returns the value at a JSON pointer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the body is not JSON or the pointer
    /// does not exist.
    pub fn json_at(&self, pointer: &str) -> Result<Value, ApiError> {
        let mut value = self.json()?;
        value
            .pointer_mut(pointer)
            .map(Value::take)
            .ok_or_else(|| ApiError::Decode(format!("response has no {pointer}")))
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking CloudBar API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Client configuration.
    config: ClientConfig,
    /// Underlying HTTP client.
    http: Client,
    /// Bearer used for machine-token calls.
    machine_token: Option<String>,
    /// Dereferenced schema document, loaded on first use and shared by clones.
    schema: Arc<OnceLock<Arc<SchemaDocument>>>,
}

impl ApiClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| ApiError::ClientBuild(err.to_string()))?;
        Ok(Self {
            config,
            http,
            machine_token: None,
            schema: Arc::new(OnceLock::new()),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Attaches the bearer used for machine-token calls.
    pub fn set_machine_token(&mut self, token: Option<String>) {
        self.machine_token = token;
    }

    /// Logs in with the configured credentials and returns the access token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] when login is rejected or returns no token.
    pub fn login(&self) -> Result<String, ApiError> {
        let Some(credentials) = &self.config.credentials else {
            return Err(ApiError::Auth {
                status: 0,
                body: "no credentials configured".to_string(),
            });
        };
        let body = serde_json::to_value(credentials)
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        let response = self.send(Method::Post, LOGIN_PATH, None, &RequestOptions::new().json(body))?;
        if response.status() != ResponseCode::Ok.as_u16() {
            return Err(ApiError::Auth {
                status: response.status(),
                body: response.text().to_string(),
            });
        }
        match response.json_at("/data/accessToken") {
            Ok(Value::String(token)) => Ok(token),
            _ => Err(ApiError::Auth {
                status: response.status(),
                body: response.text().to_string(),
            }),
        }
    }

    /// Issues a call and returns the response without asserting its status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when authentication or the transport fails.
    pub fn request(
        &self,
        path: &ResolvedPath,
        method: Method,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let bearer = self.bearer_for(path.token_kind)?;
        self.send(method, &path.path, bearer.as_deref(), options)
    }

    /// Issues a call and asserts the response status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedStatus`] with the response body when the
    /// status differs from `expected`, or any error from [`Self::request`].
    pub fn call(
        &self,
        path: &ResolvedPath,
        method: Method,
        expected: ResponseCode,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let response = self.request(path, method, options)?;
        if response.status() != expected.as_u16() {
            return Err(ApiError::UnexpectedStatus {
                expected: expected.as_u16(),
                actual: response.status(),
                body: response.text().to_string(),
            });
        }
        Ok(response)
    }

    /// Returns the schema document, loading it once per client.
    ///
    /// The first successful load reads the cache file, fetching it on a
    /// miss. Failed loads are not remembered.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the document is unavailable or invalid.
    pub fn schema_document(&self) -> Result<Arc<SchemaDocument>, SchemaError> {
        if let Some(document) = self.schema.get() {
            return Ok(Arc::clone(document));
        }
        let loaded = Arc::new(self.schema_loader().load(Some(self))?);
        Ok(Arc::clone(self.schema.get_or_init(|| loaded)))
    }

    /// Returns the loader for the configured schema cache.
    #[must_use]
    pub fn schema_loader(&self) -> SchemaLoader {
        SchemaLoader::new(self.config.schema_path.clone())
    }

    /// Returns the bearer for a credential class, if one applies.
    fn bearer_for(&self, kind: TokenKind) -> Result<Option<String>, ApiError> {
        match kind {
            TokenKind::UserToken if self.config.credentials.is_some() => self.login().map(Some),
            TokenKind::UserToken => Ok(None),
            TokenKind::MachineToken => Ok(self.machine_token.clone()),
        }
    }

    /// Sends one request and reads the full response.
    fn send(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(path, &options.query)?;
        let mut builder = self.http.request(method.to_reqwest(), url.as_str());
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }
        debug!("Request: {}", curl_command(method, &url, bearer.is_some(), options));
        let response = builder.send().map_err(|source| ApiError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            source,
        })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|source| ApiError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            source,
        })?;
        if status == ResponseCode::NotFound.as_u16() {
            debug!(status, "Response: not found");
        } else {
            debug!(status, "Response: {body}");
        }
        Ok(ApiResponse::new(status, body))
    }

    /// Joins host, path, and query pairs into a request URL.
    fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let raw = format!("{}{path}", self.config.host);
        let mut url = Url::parse(&raw).map_err(|err| ApiError::InvalidUrl {
            url: raw.clone(),
            reason: err.to_string(),
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

impl SchemaFetcher for ApiClient {
    fn fetch_schema(&self) -> Result<String, String> {
        let response = self
            .send(Method::Get, &self.config.schema_endpoint, None, &RequestOptions::new())
            .map_err(|err| err.to_string())?;
        if response.status() != ResponseCode::Ok.as_u16() {
            return Err(format!(
                "GET {} returned {}",
                self.config.schema_endpoint,
                response.status()
            ));
        }
        Ok(response.text().to_string())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders a curl reproduction of a request with the bearer redacted.
fn curl_command(method: Method, url: &Url, authorized: bool, options: &RequestOptions) -> String {
    let mut command = format!(
        "curl -X {method} -H \"content-type: {JSON_MEDIA_TYPE}\" -H \"accept: {JSON_MEDIA_TYPE}\""
    );
    if authorized {
        command.push_str(" -H \"authorization: Bearer <redacted>\"");
    }
    for (name, value) in &options.headers {
        command.push_str(&format!(" -H \"{name}: {value}\""));
    }
    if let Some(body) = &options.body {
        command.push_str(&format!(" -d '{body}'"));
    }
    command.push_str(&format!(" '{url}'"));
    command
}

// ============================================================================
// SECTION: Tests
// ============================================================================
