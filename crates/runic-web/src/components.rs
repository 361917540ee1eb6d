//! UI Components

use leptos::prelude::*;
use runic_core::views::{NavbarModel, agent_href};
use runic_core::{AgentDetails, AgentId};

use crate::app::{use_app_state, use_services};

/// Top bar: home link, wallet summary, connect / logout
#[component]
pub fn Navbar() -> impl IntoView {
    let services = use_services();
    let app_state = use_app_state();
    let model = Memo::new(move |_| NavbarModel::from_state(&app_state.get()));

    let toggle = {
        let session = services.session.clone();
        move |_| {
            let session = session.clone();
            leptos::task::spawn_local(async move {
                // failures already surface through the warning modal
                let _ = session.toggle().await;
            });
        }
    };

    let retry_balance = {
        let session = services.session.clone();
        move |_| {
            if !NavbarModel::can_retry_balance(&app_state.get_untracked()) {
                return;
            }
            let session = session.clone();
            leptos::task::spawn_local(async move {
                let _ = session.refresh_wallet_summary().await;
            });
        }
    };

    let store = services.store;

    view! {
        <nav class="navbar">
            <a href="/" class="brand">"Bitcoin Agent Jungle"</a>
            <Show when=move || model.get().show_home_link>
                <a
                    href="/"
                    class="home-link"
                    on:click={
                        let store = store.clone();
                        move |_| NavbarModel::go_home(&store)
                    }
                >
                    "Create your own AI agent"
                </a>
            </Show>
            <div class="wallet">
                {move || model.get().principal.map(|p| view! { <span class="principal">{p}</span> })}
                {move || model.get().deposit_address.map(|a| view! { <span class="address">{a}</span> })}
                {move || {
                    model
                        .get()
                        .balance
                        .map(|b| view! { <span class="balance" on:click=retry_balance.clone()>{b}</span> })
                }}
                <a href="/vault" class="vault-link">"Vault"</a>
                <button on:click=toggle disabled=move || model.get().authenticating>
                    {move || model.get().button_label}
                </button>
            </div>
        </nav>
    }
}

/// Shows the pending warning until dismissed
#[component]
pub fn WarningModal() -> impl IntoView {
    let store = use_services().store;
    let app_state = use_app_state();

    view! {
        {move || {
            app_state
                .get()
                .warning
                .map(|message| {
                    let store = store.clone();
                    view! {
                        <div class="modal-backdrop">
                            <div class="modal warning">
                                <p>{message}</p>
                                <button on:click=move |_| store.clear_warning()>"OK"</button>
                            </div>
                        </div>
                    }
                })
        }}
    }
}

/// Catalog tile for one agent
#[component]
pub fn AgentCard(id: AgentId, agent: AgentDetails) -> impl IntoView {
    let created = agent.created_at_utc().format("%Y-%m-%d").to_string();

    view! {
        <a href=agent_href(id) class="agent-card">
            {agent.logo.clone().map(|src| view! { <img src=src alt="logo" /> })}
            <h3>{agent.agent_name.clone()} " (" {agent.symbol()} ")"</h3>
            <p class="description">{agent.description.clone()}</p>
            <p class="meta">
                "Market cap: " {agent.market_cap_display()} " ₿ · "
                {agent.holders} " holders · created " {created}
            </p>
        </a>
    }
}
