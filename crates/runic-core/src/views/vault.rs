//! Vault (balance table)

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::RunicError;
use crate::model::BalanceEntry;
use crate::service::CanisterConnector;
use crate::store::AppStore;
use crate::task::{ScopeHandle, ViewScope};

const INVALID_BALANCE: &str = "Invalid balance";

/// One formatted row of the balance table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceRow {
    pub token: String,
    pub amount: String,
}

impl From<&BalanceEntry> for BalanceRow {
    fn from(entry: &BalanceEntry) -> Self {
        let amount = u128::try_from(&entry.amount.0).map_or_else(
            |_| INVALID_BALANCE.to_string(),
            |minor| entry.denomination().format_minor(minor),
        );
        Self {
            token: entry.token.clone(),
            amount,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VaultState {
    #[default]
    Loading,
    Loaded(Vec<BalanceRow>),
    Failed(String),
}

/// Controller of the vault page
pub struct VaultView {
    connector: Arc<dyn CanisterConnector>,
    store: AppStore,
    scope: ViewScope,
    state: RwLock<VaultState>,
}

impl VaultView {
    pub fn new(connector: Arc<dyn CanisterConnector>, store: AppStore) -> Self {
        Self {
            connector,
            store,
            scope: ViewScope::new(),
            state: RwLock::new(VaultState::Loading),
        }
    }

    pub fn scope(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn state(&self) -> VaultState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Fetch balances for the connected wallet
    pub async fn load(&self) -> Option<VaultState> {
        let Some(wallet) = self.store.wallet() else {
            let next = VaultState::Failed(RunicError::NotAuthenticated.user_message());
            return self.scope.handle().apply(|| self.set(next));
        };

        let fetched = self
            .scope
            .handle()
            .guard(async {
                self.connector
                    .connect(Some(&wallet))
                    .await?
                    .get_balances()
                    .await
            })
            .await?;

        let next = match &fetched {
            Ok(entries) => VaultState::Loaded(entries.iter().map(BalanceRow::from).collect()),
            Err(e) => VaultState::Failed(e.user_message()),
        };
        self.scope.handle().apply(|| {
            if let Err(e) = &fetched {
                self.store.report(e);
            }
            self.set(next)
        })
    }

    fn set(&self, next: VaultState) -> VaultState {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clone_from(&next);
        next
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
