//! Navbar display model

use crate::amount::Denomination;
use crate::identity::Wallet;
use crate::store::{AppState, AppStore, AuthState, BalanceStatus};

const CONNECT: &str = "[ connect ]";
const LOGOUT: &str = "[ logout ]";

/// Everything the navbar renders, derived from one state snapshot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavbarModel {
    pub button_label: &'static str,
    /// Login popup is open
    pub authenticating: bool,
    pub principal: Option<String>,
    pub deposit_address: Option<String>,
    /// `None` while anonymous
    pub balance: Option<String>,
    /// "Create your own AI agent" link, shown while an agent is selected
    pub show_home_link: bool,
}

impl NavbarModel {
    pub fn from_state(state: &AppState) -> Self {
        let wallet = state.wallet();
        let balance = wallet.map(|_| match state.wallet_summary.balance {
            BalanceStatus::Loading => "loading…".to_string(),
            BalanceStatus::Loaded(sats) => {
                format!("{} ₿", Denomination::Bitcoin.format_minor(u128::from(sats)))
            }
            BalanceStatus::Unavailable => "unavailable".to_string(),
        });

        Self {
            button_label: if wallet.is_some() { LOGOUT } else { CONNECT },
            authenticating: state.auth == AuthState::Authenticating,
            principal: wallet.map(Wallet::short_principal),
            deposit_address: wallet.and(state.wallet_summary.address.clone()),
            balance,
            show_home_link: state.selected_agent.is_some(),
        }
    }

    /// Balance can be re-fetched by clicking it
    pub const fn can_retry_balance(state: &AppState) -> bool {
        state.is_authenticated() && matches!(state.wallet_summary.balance, BalanceStatus::Unavailable)
    }

    /// Home link: leave the agent page context
    pub fn go_home(store: &AppStore) {
        store.select_agent(None);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mock::TestIdentity;
    use crate::model::AgentBy;
    use crate::store::WalletSummary;

    #[test]
    fn test_anonymous_navbar() {
        let model = NavbarModel::from_state(&AppState::default());
        assert_eq!(model.button_label, "[ connect ]");
        assert_eq!(model.balance, None);
        assert_eq!(model.principal, None);
        assert!(!model.show_home_link);
    }

    #[test]
    fn test_balance_states() {
        let store = AppStore::new();
        let wallet = Wallet::from_identity(Arc::new(TestIdentity::named("alice"))).unwrap();
        let principal = wallet.principal();
        store.sign_in(wallet);

        let model = NavbarModel::from_state(&store.snapshot());
        assert_eq!(model.button_label, "[ logout ]");
        assert_eq!(model.balance.as_deref(), Some("loading…"));

        store.set_wallet_summary(
            principal,
            WalletSummary {
                address: Some("bc1qalice".into()),
                balance: BalanceStatus::Loaded(150_000),
            },
        );
        let model = NavbarModel::from_state(&store.snapshot());
        assert_eq!(model.balance.as_deref(), Some("0.00150000 ₿"));
        assert_eq!(model.deposit_address.as_deref(), Some("bc1qalice"));

        store.set_wallet_summary(
            principal,
            WalletSummary {
                address: None,
                balance: BalanceStatus::Unavailable,
            },
        );
        let state = store.snapshot();
        let model = NavbarModel::from_state(&state);
        assert_eq!(model.balance.as_deref(), Some("unavailable"));
        assert!(NavbarModel::can_retry_balance(&state));
    }

    #[test]
    fn test_home_link_clears_selection() {
        let store = AppStore::new();
        store.select_agent(Some(AgentBy::Id(5)));
        assert!(NavbarModel::from_state(&store.snapshot()).show_home_link);

        NavbarModel::go_home(&store);
        assert!(!NavbarModel::from_state(&store.snapshot()).show_home_link);
    }
}
