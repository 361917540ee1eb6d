//! IC Connector
//!
//! Builds an `ic-agent` [`Agent`] per call, bound to the current wallet or
//! anonymous.

use async_trait::async_trait;
use candid::Principal;
use ic_agent::Agent;
use runic_core::{CanisterConnector, CanisterService, ClientConfig, Result, Wallet};

use crate::canister::IcCanister;
use crate::reject::map_agent_error;

/// Connector for a deployed backend canister
#[derive(Clone, Debug)]
pub struct IcConnector {
    config: ClientConfig,
    canister_id: Principal,
}

impl IcConnector {
    /// Create from configuration
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let canister_id = config.canister_id()?;
        Ok(Self {
            config,
            canister_id,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build an agent for `wallet` and bind it to the backend canister
    pub async fn canister(&self, wallet: Option<&Wallet>) -> Result<IcCanister> {
        let builder = Agent::builder().with_url(self.config.ic_host.as_str());
        let builder = match wallet {
            Some(wallet) => builder.with_arc_identity(wallet.identity()),
            None => builder,
        };
        let agent = builder.build().map_err(map_agent_error)?;

        if self.config.fetch_root_key {
            agent.fetch_root_key().await.map_err(map_agent_error)?;
        }
        tracing::trace!(
            canister = %self.canister_id,
            caller = ?wallet.map(Wallet::principal),
            "agent ready"
        );
        Ok(IcCanister::new(agent, self.canister_id))
    }
}

#[async_trait(?Send)]
impl CanisterConnector for IcConnector {
    async fn connect(&self, wallet: Option<&Wallet>) -> Result<Box<dyn CanisterService>> {
        Ok(Box::new(self.canister(wallet).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_config() {
        assert!(IcConnector::from_config(ClientConfig::local("nope")).is_err());

        let mut config = ClientConfig::mainnet("bkyz2-fmaaa-aaaaa-qaaaq-cai");
        config.ic_host = "icp-api.io".into();
        assert!(IcConnector::from_config(config).is_err());
    }

    #[tokio::test]
    async fn test_builds_anonymous_agent_offline() {
        let connector =
            IcConnector::from_config(ClientConfig::mainnet("bkyz2-fmaaa-aaaaa-qaaaq-cai")).unwrap();
        let canister = connector.canister(None).await.unwrap();
        assert_eq!(canister.canister_id().to_text(), "bkyz2-fmaaa-aaaaa-qaaaq-cai");
    }
}
