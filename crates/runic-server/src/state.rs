//! Application State

use std::path::PathBuf;
use std::sync::Arc;

use runic_client::IcConnector;
use runic_core::ClientConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Backend canister connector (None if BACKEND_CANISTER_ID is not configured)
    pub connector: Option<Arc<IcConnector>>,

    /// Directory holding the compiled front end
    pub static_dir: PathBuf,
}

impl AppState {
    /// Configuration handed to the browser
    pub fn client_config(&self) -> Option<&ClientConfig> {
        self.connector.as_deref().map(IcConnector::config)
    }
}
