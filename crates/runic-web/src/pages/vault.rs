//! Vault Page

use std::sync::Arc;

use leptos::prelude::*;
use runic_core::Wallet;
use runic_core::views::{VaultState, VaultView};

use crate::app::{use_app_state, use_services};

#[component]
pub fn VaultPage() -> impl IntoView {
    let services = use_services();
    let app_state = use_app_state();

    let wallet = Memo::new(move |_| app_state.with(|s| s.wallet().map(Wallet::principal)));

    // Reload when the wallet changes (login / logout while on the page)
    move || {
        wallet.track();
        let vault = Arc::new(VaultView::new(
            Arc::clone(&services.connector),
            services.store.clone(),
        ));
        view! { <BalanceTable vault=vault /> }
    }
}

#[component]
fn BalanceTable(vault: Arc<VaultView>) -> impl IntoView {
    let (state, set_state) = signal(vault.state());

    {
        let vault = Arc::clone(&vault);
        leptos::task::spawn_local(async move {
            if let Some(next) = vault.load().await {
                set_state.set(next);
            }
        });
    }
    on_cleanup(move || vault.close());

    view! {
        <div class="vault">
            <h1>"Vault"</h1>
            {move || match state.get() {
                VaultState::Loading => view! { <p class="loading">"Loading balances…"</p> }.into_any(),
                VaultState::Failed(message) => view! { <p class="error">{message}</p> }.into_any(),
                VaultState::Loaded(rows) => view! {
                    <table>
                        <thead>
                            <tr><th>"Token"</th><th>"Balance"</th></tr>
                        </thead>
                        <tbody>
                            {rows
                                .into_iter()
                                .map(|row| view! { <tr><td>{row.token}</td><td>{row.amount}</td></tr> })
                                .collect_view()}
                        </tbody>
                    </table>
                }
                .into_any(),
            }}
        </div>
    }
}
