//! Login Session Lifecycle
//!
//! ```text
//!   Anonymous ──login──▶ Authenticating ──ok──▶ Authenticated(wallet)
//!       ▲                      │                        │
//!       └──────failure─────────┘◀────────logout─────────┘
//! ```
//!
//! Entering `Authenticated` fetches the deposit address and bitcoin balance
//! for the navbar. That fetch is tried once; on failure the balance shows as
//! unavailable until [`AuthSession::refresh_wallet_summary`] is called again.

use std::sync::Arc;

use crate::error::{Result, RunicError};
use crate::identity::{IdentityProvider, Wallet};
use crate::service::CanisterConnector;
use crate::store::{AppState, AppStore, BalanceStatus, WalletSummary};

/// Drives login, logout and the wallet summary
#[derive(Clone)]
pub struct AuthSession {
    store: AppStore,
    provider: Arc<dyn IdentityProvider>,
    connector: Arc<dyn CanisterConnector>,
}

impl AuthSession {
    pub fn new(
        store: AppStore,
        provider: Arc<dyn IdentityProvider>,
        connector: Arc<dyn CanisterConnector>,
    ) -> Self {
        Self {
            store,
            provider,
            connector,
        }
    }

    /// Navbar button: log out when connected, log in otherwise
    pub async fn toggle(&self) -> Result<()> {
        if self.store.read(AppState::is_authenticated) {
            self.logout().await
        } else {
            self.login().await.map(|_| ())
        }
    }

    /// Run the provider login flow and enter `Authenticated`.
    ///
    /// Failures (provider error, closed window, anonymous identity) leave the
    /// store anonymous with one warning.
    pub async fn login(&self) -> Result<Wallet> {
        if let Some(wallet) = self.store.wallet() {
            return Ok(wallet);
        }
        if !self.store.begin_login() {
            return Err(RunicError::LoginFailed("login already in progress".into()));
        }
        tracing::debug!(provider = self.provider.name(), "starting login");

        let wallet = match self.provider.login().await {
            Ok(Some(identity)) => Wallet::from_identity(identity),
            Ok(None) => Err(RunicError::LoginFailed("login window closed".into())),
            Err(e) => Err(e),
        };

        match wallet {
            Ok(wallet) => {
                self.store.sign_in(wallet.clone());
                // Best effort: a failure here does not undo the login
                let _ = self.refresh_wallet_summary().await;
                Ok(wallet)
            }
            Err(e) => {
                self.store.abort_login();
                self.store.report(&e);
                Err(e)
            }
        }
    }

    /// Clear local state, then end the provider session
    pub async fn logout(&self) -> Result<()> {
        self.store.sign_out();
        self.provider.logout().await.inspect_err(|e| self.store.report(e))
    }

    /// Fetch deposit address and bitcoin balance for the connected wallet
    pub async fn refresh_wallet_summary(&self) -> Result<WalletSummary> {
        let wallet = self.store.wallet().ok_or(RunicError::NotAuthenticated)?;
        let principal = wallet.principal();
        self.store.set_wallet_summary(principal, WalletSummary::default());

        match self.fetch_wallet_summary(&wallet).await {
            Ok(summary) => {
                self.store.set_wallet_summary(principal, summary.clone());
                Ok(summary)
            }
            Err(e) => {
                let unavailable = WalletSummary {
                    address: None,
                    balance: BalanceStatus::Unavailable,
                };
                // Only warn if the wallet is still the one we fetched for
                if self.store.set_wallet_summary(principal, unavailable) {
                    self.store.report(&e);
                }
                Err(e)
            }
        }
    }

    async fn fetch_wallet_summary(&self, wallet: &Wallet) -> Result<WalletSummary> {
        let address = self
            .connector
            .connect(Some(wallet))
            .await?
            .get_deposit_address()
            .await?;
        let balance = self
            .connector
            .connect(Some(wallet))
            .await?
            .get_bitcoin_balance()
            .await?;
        Ok(WalletSummary {
            address: Some(address),
            balance: BalanceStatus::Loaded(balance),
        })
    }
}
