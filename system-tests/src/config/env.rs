// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for live suites.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: cloudbar-client, dotenvy
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8, empty values, and half-set credentials
//! fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use cloudbar_client::ClientConfig;
use cloudbar_client::Credentials;
use cloudbar_client::client::DEFAULT_BACKEND_HOST;
use cloudbar_client::client::DEFAULT_SCHEMA_ENDPOINT;
use cloudbar_client::client::DEFAULT_TIMEOUT;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Corporation that owns Locations created without an explicit owner.
pub const DEFAULT_HQ_USER_NAME: &str = "avrch1688539889";

/// Schema cache location relative to this crate.
const DEFAULT_SCHEMA_FILE: &str = "res/schema/swagger.json";

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Backend base URL.
    BackendHost,
    /// Login account name.
    UserName,
    /// Login password.
    UserPassword,
    /// Default corporation owner for Locations.
    HqUserName,
    /// Cached schema document path.
    SchemaPath,
    /// Schema-serving endpoint on the backend.
    SchemaEndpoint,
    /// Request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Case identifier that restricts which suites run.
    CaseId,
}

impl HarnessEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 8] = [
        Self::BackendHost,
        Self::UserName,
        Self::UserPassword,
        Self::HqUserName,
        Self::SchemaPath,
        Self::SchemaEndpoint,
        Self::TimeoutSeconds,
        Self::CaseId,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BackendHost => "CLOUDBAR_BACKEND_HOST",
            Self::UserName => "CLOUDBAR_TEST_USER_NAME",
            Self::UserPassword => "CLOUDBAR_TEST_USER_PASSWORD",
            Self::HqUserName => "CLOUDBAR_TEST_HQ_USER_NAME",
            Self::SchemaPath => "CLOUDBAR_SCHEMA_PATH",
            Self::SchemaEndpoint => "CLOUDBAR_SCHEMA_ENDPOINT",
            Self::TimeoutSeconds => "CLOUDBAR_TIMEOUT_SEC",
            Self::CaseId => "CLOUDBAR_CASE_ID",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Backend base URL.
    pub backend_host: String,
    /// Login credentials; absent when neither name nor password is set.
    pub credentials: Option<Credentials>,
    /// Default corporation owner for Locations.
    pub hq_user_name: String,
    /// Cached schema document path.
    pub schema_path: PathBuf,
    /// Schema-serving endpoint.
    pub schema_endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Selected case identifier, if any.
    pub case_id: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            backend_host: DEFAULT_BACKEND_HOST.to_string(),
            credentials: None,
            hq_user_name: DEFAULT_HQ_USER_NAME.to_string(),
            schema_path: default_schema_path(),
            schema_endpoint: DEFAULT_SCHEMA_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            case_id: None,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from environment variables only.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (an invalid timeout, or only one of the two
    /// credential variables set).
    pub fn load() -> Result<Self, String> {
        let defaults = Self::default();
        let backend_host = read_env_nonempty(HarnessEnv::BackendHost.as_str())?
            .unwrap_or(defaults.backend_host);
        let credentials = match (
            read_env_nonempty(HarnessEnv::UserName.as_str())?,
            read_env_nonempty(HarnessEnv::UserPassword.as_str())?,
        ) {
            (Some(user_name), Some(password)) => Some(Credentials {
                user_name,
                password,
            }),
            (None, None) => None,
            _ => {
                return Err(format!(
                    "{} and {} must be set together",
                    HarnessEnv::UserName.as_str(),
                    HarnessEnv::UserPassword.as_str()
                ));
            }
        };
        let hq_user_name = read_env_nonempty(HarnessEnv::HqUserName.as_str())?
            .unwrap_or(defaults.hq_user_name);
        let schema_path = read_env_nonempty(HarnessEnv::SchemaPath.as_str())?
            .map_or(defaults.schema_path, PathBuf::from);
        let schema_endpoint = read_env_nonempty(HarnessEnv::SchemaEndpoint.as_str())?
            .unwrap_or(defaults.schema_endpoint);
        let timeout = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?
            .unwrap_or(defaults.timeout);
        let case_id = read_env_nonempty(HarnessEnv::CaseId.as_str())?
            .map(|value| value.trim().to_string());
        Ok(Self {
            backend_host,
            credentials,
            hq_user_name,
            schema_path,
            schema_endpoint,
            timeout,
            case_id,
        })
    }

    /// Loads an optional `.env` file from the working directory, then the
    /// environment.
    ///
    /// Variables already present in the process environment take precedence
    /// over the file.
    ///
    /// # Errors
    ///
    /// Returns an error when the `.env` file exists but cannot be parsed, or
    /// when [`HarnessConfig::load`] fails.
    pub fn load_with_dotenv() -> Result<Self, String> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(err) => return Err(format!(".env could not be loaded: {err}")),
        }
        Self::load()
    }

    /// Returns the client configuration for these settings.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.backend_host.as_str());
        config.credentials.clone_from(&self.credentials);
        config.timeout = self.timeout;
        config.schema_path.clone_from(&self.schema_path);
        config.schema_endpoint.clone_from(&self.schema_endpoint);
        config
    }

    /// Returns true when `case_id` should run under the current selector.
    #[must_use]
    pub fn selects(&self, case_id: &str) -> bool {
        self.case_id.as_deref().is_none_or(|selected| selected == case_id)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the schema cache path under this crate.
fn default_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_SCHEMA_FILE)
}

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
