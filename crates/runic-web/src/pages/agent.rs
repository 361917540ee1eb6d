//! Agent Page
//!
//! `/agent?id=<n>`: agent header plus the market, jackpot and chat tabs.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use runic_core::views::{
    AgentTab, AgentView, AgentViewState, ChatBox, ChatLine, JackpotPanel, JackpotStatus,
    MarketPanel, TradeForm, TradeSide,
};
use runic_core::{AgentBy, AgentDetails, AgentId, Wallet};

use crate::app::{use_app_state, use_services};

#[component]
pub fn AgentPage() -> impl IntoView {
    let query = use_query_map();

    // Rebuilt (and the previous view torn down) whenever the id changes
    move || {
        let raw_id = query.with(|q| q.get("id"));
        view! { <AgentDetail raw_id=raw_id /> }
    }
}

#[component]
fn AgentDetail(raw_id: Option<String>) -> impl IntoView {
    let services = use_services();
    let controller = Arc::new(AgentView::from_query(
        raw_id.as_deref(),
        services.connector,
        services.store,
    ));
    let (state, set_state) = signal(controller.state());
    let (tab, set_tab) = signal(controller.tab());

    {
        let controller = Arc::clone(&controller);
        leptos::task::spawn_local(async move {
            if let Some(next) = controller.load().await {
                set_state.set(next);
            }
        });
    }
    {
        let controller = Arc::clone(&controller);
        on_cleanup(move || controller.close());
    }

    let id = controller.id();
    let select = move |next: AgentTab| {
        controller.select_tab(next);
        set_tab.set(next);
    };

    move || match state.get() {
        AgentViewState::Loading => view! { <p class="loading">"Loading agent…"</p> }.into_any(),
        AgentViewState::NotFound => view! { <p class="error">"Agent not found."</p> }.into_any(),
        AgentViewState::Error(message) => view! { <p class="error">{message}</p> }.into_any(),
        AgentViewState::Loaded(agent) => {
            let Some(id) = id else {
                return view! { <p class="error">"Invalid or missing id parameter"</p> }.into_any();
            };
            let agent = *agent;
            let select = select.clone();
            view! {
                <div class="agent">
                    <AgentHeader agent=agent.clone() />
                    <nav class="tabs">
                        {AgentTab::ALL
                            .into_iter()
                            .map(|t| {
                                let select = select.clone();
                                view! {
                                    <button
                                        class:active=move || tab.get() == t
                                        on:click=move |_| select(t)
                                    >
                                        {t.label()}
                                    </button>
                                }
                            })
                            .collect_view()}
                    </nav>
                    {move || match tab.get() {
                        AgentTab::Market => view! { <MarketTab id=id symbol=agent.symbol() /> }.into_any(),
                        AgentTab::Jackpot => view! { <JackpotTab id=id agent=agent.clone() /> }.into_any(),
                        AgentTab::Chat => view! { <ChatTab id=id /> }.into_any(),
                    }}
                </div>
            }
            .into_any()
        }
    }
}

#[component]
fn AgentHeader(agent: AgentDetails) -> impl IntoView {
    let links = agent
        .links()
        .into_iter()
        .map(|(label, href)| view! { <a href=href.to_string() target="_blank">{label}</a> })
        .collect_view();

    view! {
        <header class="agent-header">
            {agent.logo.clone().map(|src| view! { <img src=src alt="logo" /> })}
            <h1>{agent.agent_name.clone()} " (" {agent.symbol()} ")"</h1>
            <p>{agent.description.clone()}</p>
            <dl>
                <dt>"Rune"</dt><dd>{agent.runeid.clone()}</dd>
                <dt>"Market cap"</dt><dd>{agent.market_cap_display()} " ₿"</dd>
                <dt>"Holders"</dt><dd>{agent.holders}</dd>
                <dt>"Created"</dt><dd>{agent.created_at_utc().to_rfc2822()}</dd>
            </dl>
            <div class="links">{links}</div>
        </header>
    }
}

#[component]
fn MarketTab(id: AgentId, symbol: String) -> impl IntoView {
    let services = use_services();
    let panel = Arc::new(MarketPanel::new(
        AgentBy::Id(id),
        symbol,
        services.connector,
        services.store,
    ));
    let form = RwSignal::new(TradeForm::default());
    let (busy, set_busy) = signal(false);

    {
        let panel = Arc::clone(&panel);
        on_cleanup(move || panel.close());
    }

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let panel = Arc::clone(&panel);
        set_busy.set(true);
        leptos::task::spawn_local(async move {
            let _ = panel.submit(&form.get_untracked()).await;
            set_busy.set(false);
        });
    };

    let side = move |s: TradeSide| {
        view! {
            <button
                type="button"
                class:active=move || form.with(|f| f.side == s)
                on:click=move |_| form.update(|f| f.side = s)
            >
                {s.label()}
            </button>
        }
    };

    view! {
        <form class="market" on:submit=submit>
            <div class="sides">{side(TradeSide::Buy)} {side(TradeSide::Sell)}</div>
            <label>
                {move || format!("Amount ({})", form.with(|f| f.side.input().label()))}
                <input
                    type="text"
                    prop:value=move || form.with(|f| f.amount.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| f.amount = value);
                    }
                />
            </label>
            <label>
                {move || format!("Minimum received ({})", form.with(|f| f.side.output().label()))}
                <input
                    type="text"
                    prop:value=move || form.with(|f| f.min_out.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| f.min_out = value);
                    }
                />
            </label>
            <button type="submit" disabled=move || busy.get()>
                {move || if busy.get() { "..." } else { "Submit" }}
            </button>
        </form>
    }
}

#[component]
fn JackpotTab(id: AgentId, agent: AgentDetails) -> impl IntoView {
    let services = use_services();
    let panel = Arc::new(JackpotPanel::new(
        AgentBy::Id(id),
        &agent,
        services.connector,
        services.store,
    ));
    let (message, set_message) = signal(String::new());
    let (busy, set_busy) = signal(false);

    {
        let panel = Arc::clone(&panel);
        on_cleanup(move || panel.close());
    }

    let status = panel.status().clone();
    let attempt = move |_| {
        let panel = Arc::clone(&panel);
        set_busy.set(true);
        leptos::task::spawn_local(async move {
            if panel.attempt(&message.get_untracked()).await.is_some() {
                set_message.set(String::new());
            }
            set_busy.set(false);
        });
    };

    let prize = match &status {
        JackpotStatus::Open { bitcoin, rune } => view! {
            <div class="prize">
                <p>"Bitcoin Prize: " {bitcoin.clone()} " ₿"</p>
                <p>"Rune Token Prize: " {rune.clone()}</p>
            </div>
        }
        .into_any(),
        JackpotStatus::Claimed(_) => {
            view! { <p class="claimed">{status.claimed_notice()}</p> }.into_any()
        }
    };

    view! {
        <div class="jackpot">
            <h2>"Bait the Bot"</h2>
            {prize}
            <textarea
                placeholder="Convince the bot to hand over the prize..."
                prop:value=move || message.get()
                on:input=move |ev| set_message.set(event_target_value(&ev))
            />
            <button on:click=attempt disabled=move || busy.get()>
                {move || if busy.get() { "..." } else { "Try your luck" }}
            </button>
        </div>
    }
}

#[component]
fn ChatTab(id: AgentId) -> impl IntoView {
    let services = use_services();
    let chat = Arc::new(ChatBox::new(AgentBy::Id(id), services.connector, services.store));
    let (transcript, set_transcript) = signal(Vec::<ChatLine>::new());
    let (input, set_input) = signal(String::new());
    let (ready, set_ready) = signal(chat.session().is_some());
    let (sending, set_sending) = signal(false);

    // Open (or drop) the session whenever the wallet changes
    let app_state = use_app_state();
    let wallet = Memo::new(move |_| app_state.with(|s| s.wallet().map(Wallet::principal)));
    {
        let chat = Arc::clone(&chat);
        Effect::new(move |_| {
            wallet.track();
            let chat = Arc::clone(&chat);
            leptos::task::spawn_local(async move {
                set_ready.set(chat.open().await.is_some());
            });
        });
    }
    {
        let chat = Arc::clone(&chat);
        on_cleanup(move || chat.close());
    }

    let send = move || {
        let chat = Arc::clone(&chat);
        set_sending.set(true);
        leptos::task::spawn_local(async move {
            if chat.send_message(&input.get_untracked()).await.is_some() {
                set_input.set(String::new());
                set_transcript.set(chat.transcript());
            }
            set_sending.set(false);
        });
    };

    view! {
        <div class="chatbox">
            <h2>"Chat with Bot"</h2>
            <Show when=move || !ready.get()>
                <p class="hint">"Connect your wallet to start chatting."</p>
            </Show>
            <div class="messages">
                <For
                    each=move || transcript.get().into_iter().enumerate()
                    key=|(i, _)| *i
                    children=move |(_, line)| {
                        view! {
                            <div class="message">
                                <span class="sender">{line.speaker.label()} ": "</span>
                                <span>{line.text}</span>
                            </div>
                        }
                    }
                />
            </div>
            <div class="input-area">
                <input
                    type="text"
                    placeholder="Type a message..."
                    prop:value=move || input.get()
                    on:input=move |ev| set_input.set(event_target_value(&ev))
                    on:keydown={
                        let send = send.clone();
                        move |ev| {
                            if ev.key() == "Enter" {
                                ev.prevent_default();
                                send();
                            }
                        }
                    }
                />
                <button on:click=move |_| send() disabled=move || sending.get() || !ready.get()>
                    "Send"
                </button>
            </div>
        </div>
    }
}
