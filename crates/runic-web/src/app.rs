//! Main App Component

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::{components::*, path};
use runic_client::IcConnector;
use runic_core::{AppState, AppStore, AuthSession, CanisterConnector, ClientConfig};

use crate::api;
use crate::components::{Navbar, WarningModal};
use crate::identity::InternetIdentity;
use crate::pages::{AgentPage, HomePage, VaultPage};

/// Handles shared by every page, provided as context
#[derive(Clone)]
pub struct Services {
    pub store: AppStore,
    pub connector: Arc<dyn CanisterConnector>,
    pub session: AuthSession,
}

impl Services {
    fn new(config: &ClientConfig) -> Result<Self, String> {
        let connector: Arc<dyn CanisterConnector> =
            Arc::new(IcConnector::from_config(config.clone()).map_err(|e| e.to_string())?);
        let store = AppStore::new();
        let provider = Arc::new(InternetIdentity::new(config.identity_provider.clone()));
        let session = AuthSession::new(store.clone(), provider, Arc::clone(&connector));
        tracing::debug!(canister = %config.backend_canister_id, host = %config.ic_host, "services ready");
        Ok(Self {
            store,
            connector,
            session,
        })
    }
}

/// Services from context
pub fn use_services() -> Services {
    expect_context::<Services>()
}

/// Reactive mirror of the store
pub fn use_app_state() -> ReadSignal<AppState> {
    expect_context::<ReadSignal<AppState>>()
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let config = LocalResource::new(api::fetch_config);

    view! {
        <Suspense fallback=|| view! { <p class="loading">"Loading…"</p> }>
            {move || Suspend::new(async move {
                match config.await {
                    Ok(config) => view! { <Shell config=config /> }.into_any(),
                    Err(e) => view! { <p class="error">"Configuration unavailable: " {e}</p> }.into_any(),
                }
            })}
        </Suspense>
    }
}

/// Router and chrome, once configuration is known
#[component]
fn Shell(config: ClientConfig) -> impl IntoView {
    let services = match Services::new(&config) {
        Ok(services) => services,
        Err(e) => return view! { <p class="error">"Configuration invalid: " {e}</p> }.into_any(),
    };

    let (app_state, set_app_state) = signal(services.store.snapshot());
    let mut rx = services.store.subscribe();
    leptos::task::spawn_local(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            set_app_state.set(snapshot);
        }
    });

    provide_context(services);
    provide_context(app_state);

    view! {
        <Router>
            <Navbar />
            <WarningModal />
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/agent") view=AgentPage />
                    <Route path=path!("/vault") view=VaultPage />
                </Routes>
            </main>
        </Router>
    }
    .into_any()
}
