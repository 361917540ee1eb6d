//! Agent Catalog (Home page)
//!
//! Full agent listing, fetched on mount and every [`AGENT_REFRESH_INTERVAL`]
//! after that. A failed fetch shows an empty list; it is logged, not surfaced.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::model::{AgentDetails, AgentId};
use crate::service::CanisterConnector;
use crate::store::AppStore;
use crate::task::{ScopeHandle, ViewScope};

/// Polling period of the Home listing
pub const AGENT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Route of an agent's detail page
pub fn agent_href(id: AgentId) -> String {
    format!("/agent?id={id}")
}

/// Home page agent listing
pub struct AgentCatalog {
    connector: Arc<dyn CanisterConnector>,
    store: AppStore,
    scope: ViewScope,
    entries: RwLock<Vec<(AgentId, AgentDetails)>>,
}

impl AgentCatalog {
    pub fn new(connector: Arc<dyn CanisterConnector>, store: AppStore) -> Self {
        Self {
            connector,
            store,
            scope: ViewScope::new(),
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn scope(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Current listing in canister order
    pub fn entries(&self) -> Vec<(AgentId, AgentDetails)> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Re-fetch the listing.
    ///
    /// Returns the new listing, or `None` if the view was torn down before
    /// the call finished (nothing is updated in that case).
    pub async fn refresh(&self) -> Option<Vec<(AgentId, AgentDetails)>> {
        let wallet = self.store.wallet();
        let fetched = self
            .scope
            .handle()
            .guard(async {
                self.connector
                    .connect(wallet.as_ref())
                    .await?
                    .get_agents()
                    .await
            })
            .await?;

        let listing = fetched.unwrap_or_else(|e| {
            tracing::warn!("agent listing refresh failed: {e}");
            Vec::new()
        });

        self.scope.handle().apply(|| {
            tracing::debug!(agents = listing.len(), "agent listing refreshed");
            self.entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .clone_from(&listing);
            listing
        })
    }

    /// Stop polling; in-flight refreshes are discarded
    pub fn cancel(&self) {
        self.scope.close();
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;
    use crate::mock::{MockCanister, sample_agent};

    fn catalog(canister: &MockCanister) -> AgentCatalog {
        AgentCatalog::new(Arc::new(canister.clone()), AppStore::new())
    }

    #[tokio::test]
    async fn test_listing_keeps_canister_order() {
        let canister = MockCanister::new()
            .with_agent(1, sample_agent("first"))
            .with_agent(2, sample_agent("second"));
        let catalog = catalog(&canister);

        let listing = catalog.refresh().await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].0, 1);
        assert_eq!(listing[0].1.agent_name, "first");
        assert_eq!(listing[1].1.agent_name, "second");
        assert_eq!(catalog.entries(), listing);
        assert_eq!(agent_href(listing[1].0), "/agent?id=2");
    }

    #[tokio::test]
    async fn test_failed_refresh_degrades_to_empty() {
        let canister = MockCanister::new().with_agent(1, sample_agent("a"));
        let catalog = catalog(&canister);
        catalog.refresh().await.unwrap();

        canister.break_transport("get_agents");
        let listing = catalog.refresh().await.unwrap();
        assert!(listing.is_empty());
        assert!(catalog.entries().is_empty());
        assert!(catalog.store.warning().is_none());
    }

    #[tokio::test]
    async fn test_no_update_after_cancel() {
        let canister = MockCanister::new().with_agent(1, sample_agent("a"));
        let catalog = catalog(&canister);
        let gate = canister.hold("get_agents");

        let mut refresh = Box::pin(catalog.refresh());
        assert!((&mut refresh).now_or_never().is_none());

        catalog.cancel();
        gate.notify_one();
        assert_eq!(refresh.await, None);
        assert!(catalog.entries().is_empty());

        // later ticks do nothing at all
        assert_eq!(catalog.refresh().await, None);
        assert_eq!(canister.count("get_agents"), 1);
    }
}
