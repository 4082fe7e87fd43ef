//! Session wiring for the terminal

use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use vendordesk_client::{
    ClientConfig, FileStore, Navigator, VendorDeskClient, VendorDeskClientBuilder,
};

use crate::config::credentials_path;

/// Terminal stand-in for the login page redirect
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, location: &str) {
        warn!(location, "Session terminated");
        eprintln!("Your session has expired. Run `vendordesk login` to sign in again.");
    }
}

/// Build the client with the on-disk credential store
pub fn build_client(config: &ClientConfig, data_dir: &Path) -> anyhow::Result<VendorDeskClient> {
    let store = FileStore::new(credentials_path(data_dir));
    let client = VendorDeskClientBuilder::from_config(config)
        .store(Arc::new(store))
        .navigator(Arc::new(TerminalNavigator))
        .build()?;
    Ok(client)
}
