//! Application State Store
//!
//! One process-wide container for the state every view shares: the login
//! state, the selected agent, the pending warning, the navbar wallet summary,
//! and the chat session. Reads are snapshots, writes go through typed update
//! methods, and views re-render by subscribing to the underlying
//! `tokio::sync::watch` channel.

use std::sync::Arc;

use candid::Principal;
use tokio::sync::watch;

use crate::error::RunicError;
use crate::identity::Wallet;
use crate::model::{AgentBy, ChatSessionId};

/// Login state machine
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Wallet),
}

/// Navbar balance display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BalanceStatus {
    #[default]
    Loading,
    Loaded(u64),
    /// The fetch failed; shown until the user retries
    Unavailable,
}

/// Deposit address and bitcoin balance of the connected wallet
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletSummary {
    pub address: Option<String>,
    pub balance: BalanceStatus,
}

/// Chat sessions are scoped to one wallet talking to one agent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatSessionKey {
    pub wallet: Principal,
    pub agent: AgentBy,
}

/// Everything the views share
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    pub auth: AuthState,
    pub selected_agent: Option<AgentBy>,
    pub warning: Option<String>,
    pub wallet_summary: WalletSummary,
    pub chat_session: Option<(ChatSessionKey, ChatSessionId)>,
}

impl AppState {
    pub const fn wallet(&self) -> Option<&Wallet> {
        match &self.auth {
            AuthState::Authenticated(wallet) => Some(wallet),
            _ => None,
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated(_))
    }

    fn is_signed_in_as(&self, principal: Principal) -> bool {
        self.wallet().is_some_and(|wallet| wallet.principal() == principal)
    }
}

/// Shared handle to the application state
#[derive(Clone)]
pub struct AppStore {
    tx: Arc<watch::Sender<AppState>>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AppState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    /// Read without cloning the whole state
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver notified after every change
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// Apply a change; subscribers are notified only if `f` returns true
    fn update(&self, f: impl FnOnce(&mut AppState) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    pub fn wallet(&self) -> Option<Wallet> {
        self.read(|state| state.wallet().cloned())
    }

    pub fn warning(&self) -> Option<String> {
        self.read(|state| state.warning.clone())
    }

    pub fn set_warning(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|state| {
            state.warning = Some(message);
            true
        });
    }

    pub fn clear_warning(&self) {
        self.update(|state| state.warning.take().is_some());
    }

    /// Surface an error as the single warning notice for its failure
    pub fn report(&self, err: &RunicError) {
        tracing::warn!(kind = ?err.kind(), "{err}");
        self.set_warning(err.user_message());
    }

    pub fn selected_agent(&self) -> Option<AgentBy> {
        self.read(|state| state.selected_agent.clone())
    }

    pub fn select_agent(&self, agent: Option<AgentBy>) {
        self.update(|state| {
            if state.selected_agent == agent {
                return false;
            }
            state.selected_agent = agent;
            true
        });
    }

    /// `Anonymous -> Authenticating`; false if a login is already underway or done
    pub fn begin_login(&self) -> bool {
        self.update(|state| {
            if state.auth != AuthState::Anonymous {
                return false;
            }
            state.auth = AuthState::Authenticating;
            true
        })
    }

    /// `Authenticating -> Anonymous` after a failed login
    pub fn abort_login(&self) {
        self.update(|state| {
            if state.auth != AuthState::Authenticating {
                return false;
            }
            state.auth = AuthState::Anonymous;
            true
        });
    }

    /// Enter `Authenticated`; the wallet summary starts out loading
    pub fn sign_in(&self, wallet: Wallet) {
        tracing::info!(principal = %wallet.principal(), "wallet connected");
        self.update(|state| {
            state.auth = AuthState::Authenticated(wallet);
            state.wallet_summary = WalletSummary::default();
            state.chat_session = None;
            true
        });
    }

    /// Back to `Anonymous`, dropping identity, address, balance and chat
    /// session in a single change
    pub fn sign_out(&self) {
        self.update(|state| {
            state.auth = AuthState::Anonymous;
            state.wallet_summary = WalletSummary::default();
            state.chat_session = None;
            true
        });
        tracing::info!("wallet disconnected");
    }

    pub fn wallet_summary(&self) -> WalletSummary {
        self.read(|state| state.wallet_summary.clone())
    }

    /// Store a wallet summary fetched for `principal`.
    ///
    /// Ignored when that wallet is no longer signed in.
    pub fn set_wallet_summary(&self, principal: Principal, summary: WalletSummary) -> bool {
        self.update(|state| {
            if !state.is_signed_in_as(principal) {
                return false;
            }
            state.wallet_summary = summary;
            true
        })
    }

    /// Session for the signed-in wallet and `agent`, if one was opened
    pub fn chat_session_for(&self, agent: &AgentBy) -> Option<ChatSessionId> {
        self.read(|state| {
            let wallet = state.wallet()?;
            state
                .chat_session
                .as_ref()
                .filter(|(key, _)| key.wallet == wallet.principal() && &key.agent == agent)
                .map(|(_, id)| *id)
        })
    }

    /// Remember a chat session; ignored when `key.wallet` is no longer signed in
    pub fn set_chat_session(&self, key: ChatSessionKey, id: ChatSessionId) -> bool {
        self.update(|state| {
            if !state.is_signed_in_as(key.wallet) {
                return false;
            }
            state.chat_session = Some((key, id));
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::TestIdentity;

    fn wallet(name: &str) -> Wallet {
        Wallet::from_identity(Arc::new(TestIdentity::named(name))).unwrap()
    }

    #[test]
    fn test_login_transitions() {
        let store = AppStore::new();
        assert!(store.begin_login());
        assert!(!store.begin_login());
        store.abort_login();
        assert_eq!(store.snapshot().auth, AuthState::Anonymous);

        store.sign_in(wallet("alice"));
        assert!(store.snapshot().is_authenticated());
        assert!(!store.begin_login());
    }

    #[test]
    fn test_sign_out_clears_everything_at_once() {
        let store = AppStore::new();
        let alice = wallet("alice");
        store.sign_in(alice.clone());
        store.set_wallet_summary(
            alice.principal(),
            WalletSummary {
                address: Some("bc1qalice".into()),
                balance: BalanceStatus::Loaded(42),
            },
        );
        store.set_chat_session(
            ChatSessionKey {
                wallet: alice.principal(),
                agent: AgentBy::Id(1),
            },
            ChatSessionId(9),
        );

        let mut rx = store.subscribe();
        rx.borrow_and_update();
        store.sign_out();

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.auth, AuthState::Anonymous);
        assert_eq!(state.wallet_summary, WalletSummary::default());
        assert_eq!(state.chat_session, None);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_late_summary_after_logout_is_dropped() {
        let store = AppStore::new();
        let alice = wallet("alice");
        store.sign_in(alice.clone());
        store.sign_out();

        let applied = store.set_wallet_summary(
            alice.principal(),
            WalletSummary {
                address: Some("bc1qalice".into()),
                balance: BalanceStatus::Loaded(1),
            },
        );
        assert!(!applied);
        assert_eq!(store.wallet_summary().address, None);
    }

    #[test]
    fn test_chat_session_is_scoped_to_wallet_and_agent() {
        let store = AppStore::new();
        let alice = wallet("alice");
        store.sign_in(alice.clone());
        let key = ChatSessionKey {
            wallet: alice.principal(),
            agent: AgentBy::Id(1),
        };
        assert!(store.set_chat_session(key, ChatSessionId(3)));
        assert_eq!(store.chat_session_for(&AgentBy::Id(1)), Some(ChatSessionId(3)));
        assert_eq!(store.chat_session_for(&AgentBy::Id(2)), None);

        store.sign_in(wallet("bob"));
        assert_eq!(store.chat_session_for(&AgentBy::Id(1)), None);
    }

    #[test]
    fn test_warning_lifecycle() {
        let store = AppStore::new();
        store.report(&RunicError::NotAuthenticated);
        assert_eq!(store.warning().as_deref(), Some("Please connect your wallet first."));
        store.clear_warning();
        assert_eq!(store.warning(), None);
    }
}
