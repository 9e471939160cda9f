// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Live Harness
// Description: Configuration, tracing, and client setup for live suites.
// Purpose: Give each case a ready client or skip it under the case selector.
// Dependencies: system-tests, cloudbar-client, tracing-subscriber
// ============================================================================

use std::sync::Once;

use cloudbar_client::ApiClient;
use cloudbar_resources::EndpointDefaults;
use system_tests::config::HarnessConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Installs the fmt subscriber once per test binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Ready-to-use harness for one case.
pub struct Harness {
    /// Loaded settings.
    pub config: HarnessConfig,
    /// Client built from the settings.
    pub client: ApiClient,
}

impl Harness {
    /// Loads the harness for `case_id`, or `None` when the selector skips it.
    pub fn for_case(case_id: &str) -> Result<Option<Self>, Box<dyn std::error::Error>> {
        init_tracing();
        let config = HarnessConfig::load_with_dotenv()?;
        if !config.selects(case_id) {
            info!(case_id, selected = config.case_id.as_deref(), "case not selected; skipping");
            return Ok(None);
        }
        let client = ApiClient::new(config.client_config())?;
        Ok(Some(Self {
            config,
            client,
        }))
    }

    /// Returns endpoint factory defaults for this environment.
    pub fn defaults(&self) -> EndpointDefaults {
        EndpointDefaults {
            hq_user_name: self.config.hq_user_name.clone(),
        }
    }
}
