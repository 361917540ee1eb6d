//! Client Configuration

use candid::Principal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunicError};

/// Where the backend canister lives and how to log in
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Replica / boundary node URL
    pub ic_host: String,

    /// Backend canister principal (text form)
    pub backend_canister_id: String,

    /// Internet Identity URL used by the login flow
    pub identity_provider: String,

    /// Fetch the replica root key before calling (local replicas only)
    #[serde(default)]
    pub fetch_root_key: bool,
}

impl ClientConfig {
    /// Defaults for a local replica started by `dfx start`
    pub fn local(backend_canister_id: impl Into<String>) -> Self {
        Self {
            ic_host: "http://127.0.0.1:4943".into(),
            backend_canister_id: backend_canister_id.into(),
            identity_provider: "http://rdmx6-jaaaa-aaaaa-aaadq-cai.localhost:4943".into(),
            fetch_root_key: true,
        }
    }

    /// Defaults for mainnet
    pub fn mainnet(backend_canister_id: impl Into<String>) -> Self {
        Self {
            ic_host: "https://icp-api.io".into(),
            backend_canister_id: backend_canister_id.into(),
            identity_provider: "https://identity.ic0.app".into(),
            fetch_root_key: false,
        }
    }

    /// Read from `IC_HOST`, `BACKEND_CANISTER_ID`, `IDENTITY_PROVIDER` and
    /// `FETCH_ROOT_KEY`. Unset values fall back to the local-replica defaults.
    pub fn from_env() -> Result<Self> {
        let canister = std::env::var("BACKEND_CANISTER_ID")
            .map_err(|_| RunicError::Config("BACKEND_CANISTER_ID is not set".into()))?;
        let mut config = Self::local(canister);
        if let Ok(host) = std::env::var("IC_HOST") {
            config.ic_host = host;
        }
        if let Ok(provider) = std::env::var("IDENTITY_PROVIDER") {
            config.identity_provider = provider;
        }
        config.fetch_root_key = std::env::var("FETCH_ROOT_KEY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| config.is_local());
        config.validate()?;
        Ok(config)
    }

    /// True when the host points at a local replica
    pub fn is_local(&self) -> bool {
        ["://127.0.0.1", "://localhost", "://[::1]"]
            .iter()
            .any(|marker| self.ic_host.contains(marker))
    }

    /// The backend canister principal
    pub fn canister_id(&self) -> Result<Principal> {
        Principal::from_text(&self.backend_canister_id).map_err(|e| {
            RunicError::Config(format!(
                "invalid backend canister id '{}': {e}",
                self.backend_canister_id
            ))
        })
    }

    /// Check the configuration before any call is made
    pub fn validate(&self) -> Result<()> {
        self.canister_id()?;
        if !self.ic_host.starts_with("http://") && !self.ic_host.starts_with("https://") {
            return Err(RunicError::Config(format!("ic_host must be an http(s) URL, got '{}'", self.ic_host)));
        }
        Ok(())
    }
}
