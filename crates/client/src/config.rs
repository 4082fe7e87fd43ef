//! Client configuration

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

/// Fixed storage slot names for the credential pair
pub struct StorageKeys;

impl StorageKeys {
    /// Slot holding the short-lived access token
    pub const ACCESS_TOKEN: &'static str = "access_token";

    /// Slot holding the refresh token
    pub const REFRESH_TOKEN: &'static str = "refresh_token";
}

/// Backend base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Where the client sends the user once the session cannot be recovered
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Environment prefix, e.g. `VENDORDESK_BASE_URL`
pub const ENV_PREFIX: &str = "VENDORDESK";

/// How concurrent 401s are turned into refresh calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Every rejected request refreshes on its own
    #[default]
    PerRequest,
    /// Refreshes are serialised and a fresh credential is shared with waiters
    SharedInFlight,
}

/// Settings for building a [`VendorDeskClient`](crate::VendorDeskClient)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL including the API prefix
    pub base_url: String,

    /// Transport timeout in seconds, 0 disables it
    pub timeout_secs: u64,

    /// Login entry point used for redirects
    pub login_path: String,

    /// Refresh behaviour for concurrent 401s
    pub refresh_policy: RefreshPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 0,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from defaults overlaid with `VENDORDESK_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable cannot be parsed
    pub fn from_env() -> Result<Self, ClientError> {
        Self::load(config::Config::builder())
    }

    /// Load configuration from a file, then the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ClientError> {
        Self::load(config::Config::builder().add_source(config::File::from(path.as_ref())))
    }

    fn load(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ClientError> {
        let defaults = Self::default();
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_default("base_url", defaults.base_url)
            .and_then(|b| b.set_default("timeout_secs", defaults.timeout_secs))
            .and_then(|b| b.set_default("login_path", defaults.login_path))
            .and_then(|b| b.set_default("refresh_policy", "per_request"))
            .and_then(|b| b.build())
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let loaded: Self = settings
            .try_deserialize()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Check the base URL parses as an absolute http(s) URL
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` describing the problem
    pub fn validate(&self) -> Result<(), ClientError> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            ClientError::Configuration(format!("invalid base_url '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.login_path.is_empty() {
            return Err(ClientError::Configuration("login_path is empty".into()));
        }
        Ok(())
    }
}
