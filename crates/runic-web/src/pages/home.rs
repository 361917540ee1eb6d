//! Home Page

use std::sync::Arc;

use leptos::prelude::*;
use runic_core::views::{AGENT_REFRESH_INTERVAL, AgentCatalog, AgentCreator, AgentDraft, LogoUpload};

use crate::api;
use crate::app::use_services;
use crate::components::AgentCard;

#[component]
pub fn HomePage() -> impl IntoView {
    let services = use_services();
    let catalog = Arc::new(AgentCatalog::new(services.connector, services.store));
    let (agents, set_agents) = signal(Vec::new());
    let (creating, set_creating) = signal(false);

    let refresh = {
        let catalog = Arc::clone(&catalog);
        move || {
            let catalog = Arc::clone(&catalog);
            leptos::task::spawn_local(async move {
                if let Some(listing) = catalog.refresh().await {
                    set_agents.set(listing);
                }
            });
        }
    };

    refresh();
    let poll = set_interval_with_handle(refresh.clone(), AGENT_REFRESH_INTERVAL).ok();
    on_cleanup(move || {
        if let Some(handle) = poll {
            handle.clear();
        }
        catalog.cancel();
    });

    view! {
        <div class="home">
            <header class="hero">
                <h1>"Welcome to Bitcoin Agent Jungle"</h1>
                <p class="tagline">"Powered by Internet Computer"</p>
                <button class="btn btn-primary" on:click=move |_| set_creating.set(true)>
                    "Create Agent"
                </button>
            </header>

            <Show when=move || creating.get()>
                <CreateAgentModal
                    on_close=Callback::new(move |()| set_creating.set(false))
                    on_created=Callback::new({
                        let refresh = refresh.clone();
                        move |()| {
                            set_creating.set(false);
                            refresh();
                        }
                    })
                />
            </Show>

            <section class="agents">
                <For
                    each=move || agents.get()
                    key=|(id, _)| *id
                    children=move |(id, agent)| view! { <AgentCard id=id agent=agent /> }
                />
            </section>
        </div>
    }
}

/// Create-agent form in a modal
#[component]
fn CreateAgentModal(on_close: Callback<()>, on_created: Callback<()>) -> impl IntoView {
    let services = use_services();
    let store = services.store.clone();
    let creator = Arc::new(AgentCreator::new(services.connector, services.store));
    let draft = RwSignal::new(AgentDraft::default());

    {
        let creator = Arc::clone(&creator);
        on_cleanup(move || creator.close());
    }

    let on_logo = move |ev: leptos::ev::Event| {
        let input: web_sys::HtmlInputElement = event_target(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            draft.update(|d| d.logo = None);
            return;
        };
        let store = store.clone();
        leptos::task::spawn_local(async move {
            let upload = match api::read_file(file).await {
                Ok((mime, bytes)) => LogoUpload::from_bytes(&mime, &bytes),
                Err(e) => Err(runic_core::RunicError::Other(e)),
            };
            match upload {
                Ok(logo) => draft.update(|d| d.logo = Some(logo)),
                Err(e) => {
                    input.set_value("");
                    draft.update(|d| d.logo = None);
                    store.report(&e);
                }
            }
        });
    };

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let creator = Arc::clone(&creator);
        leptos::task::spawn_local(async move {
            if creator.submit(&draft.get_untracked()).await.is_some() {
                on_created.run(());
            }
        });
    };

    let field = move |name: &'static str, placeholder: &'static str| {
        view! {
            <input
                type="text"
                name=name
                placeholder=placeholder
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    draft.update(|d| match name {
                        "name" => d.name = value,
                        "ticker" => d.ticker = value,
                        "twitter" => d.twitter = value,
                        "website" => d.website = value,
                        "discord" => d.discord = value,
                        "openchat" => d.openchat = value,
                        _ => {}
                    });
                }
            />
        }
    };

    view! {
        <div class="modal-backdrop">
            <form class="modal create-agent" on:submit=submit>
                <h2>"Create Agent"</h2>
                {field("name", "Agent name")}
                {field("ticker", "Ticker (optional)")}
                {field("twitter", "Twitter (optional)")}
                {field("website", "Website (optional)")}
                {field("discord", "Discord (optional)")}
                {field("openchat", "OpenChat (optional)")}
                <textarea
                    name="description"
                    placeholder="Description"
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        draft.update(|d| d.description = value);
                    }
                />
                <label>
                    "Logo (max 1.2MB) "
                    <input type="file" accept="image/*" on:change=on_logo />
                </label>
                <div class="actions">
                    <button type="button" on:click=move |_| on_close.run(())>"Cancel"</button>
                    <button type="submit">"Create"</button>
                </div>
            </form>
        </div>
    }
}
