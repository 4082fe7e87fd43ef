//! CLI configuration utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use vendordesk_client::ClientConfig;

const CONFIG_FILE: &str = "vendordesk.toml";
const CREDENTIALS_FILE: &str = "credentials.json";

/// Resolve the data directory: explicit flag, `VENDORDESK_STATE_DIR`, then the
/// platform data directory
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        if let Ok(dir) = std::env::var("VENDORDESK_STATE_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("vendordesk")
        }
    })
}

/// File holding the stored credential pair
pub fn credentials_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CREDENTIALS_FILE)
}

/// Load client configuration.
///
/// An explicit `--config` file must exist. Otherwise `<data dir>/vendordesk.toml`
/// is used when present, and the environment alone when it is not.
pub fn load_client_config(config_file: Option<&Path>, data_dir: &Path) -> Result<ClientConfig> {
    if let Some(path) = config_file {
        info!("Loading configuration from: {}", path.display());
        return ClientConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()));
    }

    let default_config = data_dir.join(CONFIG_FILE);
    if default_config.exists() {
        info!("Loading configuration from: {}", default_config.display());
        ClientConfig::from_file(&default_config)
            .with_context(|| format!("failed to load {}", default_config.display()))
    } else {
        ClientConfig::from_env().context("failed to read VENDORDESK_* environment")
    }
}

/// Apply command-line overrides on top of loaded configuration
pub fn apply_overrides(
    mut config: ClientConfig,
    api_url: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<ClientConfig> {
    if let Some(url) = api_url {
        config.base_url = url;
    }
    if let Some(timeout) = timeout_secs {
        config.timeout_secs = timeout;
    }
    config.validate()?;
    Ok(config)
}
