//! Agent Detail Page
//!
//! ```text
//!   Loading ──▶ Loaded(agent) ── tab: market | jackpot | chat
//!      │
//!      ├──▶ NotFound
//!      └──▶ Error(message)
//! ```
//!
//! The id comes from the `?id=` query parameter. A missing or non-numeric id
//! goes straight to `Error` without calling the canister.

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Result, RunicError};
use crate::model::{AgentBy, AgentDetails, AgentId};
use crate::service::CanisterConnector;
use crate::store::AppStore;
use crate::task::{ScopeHandle, ViewScope};

/// Notice shown when the agent record could not be fetched
const LOAD_FAILED: &str = "Failed to load agent data.";

/// Parse the `id` query parameter
pub fn parse_agent_id(raw: Option<&str>) -> Result<AgentId> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RunicError::InvalidRoute("missing id".into()))?;
    raw.parse()
        .map_err(|_| RunicError::InvalidRoute(format!("'{raw}' is not a numeric id")))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentViewState {
    Loading,
    Loaded(Box<AgentDetails>),
    /// The canister has no agent with this id
    NotFound,
    Error(String),
}

/// Sub-panel shown for a loaded agent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AgentTab {
    #[default]
    Market,
    Jackpot,
    Chat,
}

impl AgentTab {
    pub const ALL: [Self; 3] = [Self::Market, Self::Jackpot, Self::Chat];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Jackpot => "jackpot",
            Self::Chat => "chat",
        }
    }
}

impl FromStr for AgentTab {
    type Err = RunicError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| RunicError::Validation(format!("unknown tab '{s}'")))
    }
}

/// Controller of the agent detail page
pub struct AgentView {
    id: Option<AgentId>,
    state: RwLock<AgentViewState>,
    tab: RwLock<AgentTab>,
    connector: Arc<dyn CanisterConnector>,
    store: AppStore,
    scope: ViewScope,
}

impl AgentView {
    /// Build the view from the raw `id` query parameter
    pub fn from_query(
        raw_id: Option<&str>,
        connector: Arc<dyn CanisterConnector>,
        store: AppStore,
    ) -> Self {
        let (id, state) = match parse_agent_id(raw_id) {
            Ok(id) => (Some(id), AgentViewState::Loading),
            Err(e) => {
                tracing::debug!("agent route rejected: {e}");
                (None, AgentViewState::Error(e.user_message()))
            }
        };
        Self {
            id,
            state: RwLock::new(state),
            tab: RwLock::new(AgentTab::default()),
            connector,
            store,
            scope: ViewScope::new(),
        }
    }

    pub const fn id(&self) -> Option<AgentId> {
        self.id
    }

    pub fn state(&self) -> AgentViewState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn tab(&self) -> AgentTab {
        *self.tab.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch panels; the agent record is not refetched
    pub fn select_tab(&self, tab: AgentTab) {
        *self.tab.write().unwrap_or_else(PoisonError::into_inner) = tab;
    }

    pub fn scope(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Fetch (or re-fetch) the agent record.
    ///
    /// Returns the resulting state, or `None` if the view was torn down first.
    pub async fn load(&self) -> Option<AgentViewState> {
        let Some(id) = self.id else {
            return Some(self.state());
        };
        let selector = AgentBy::Id(id);
        let wallet = self.store.wallet();

        let fetched = self
            .scope
            .handle()
            .guard(async {
                self.connector
                    .connect(wallet.as_ref())
                    .await?
                    .get_agent_of(&selector)
                    .await
            })
            .await?;

        let next = match &fetched {
            Ok(Some(agent)) => AgentViewState::Loaded(Box::new(agent.clone())),
            Ok(None) => AgentViewState::NotFound,
            Err(_) => AgentViewState::Error(LOAD_FAILED.into()),
        };

        self.scope.handle().apply(|| {
            if let Err(e) = &fetched {
                tracing::warn!(agent = id, "failed to load agent");
                self.store.report(e);
            }
            if matches!(next, AgentViewState::Loaded(_)) {
                self.store.select_agent(Some(selector));
            }
            self.state
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .clone_from(&next);
            next
        })
    }

    /// Tear the view down
    pub fn close(&self) {
        self.scope.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockCanister, sample_agent};

    fn view(raw: Option<&str>, canister: &MockCanister) -> AgentView {
        AgentView::from_query(raw, Arc::new(canister.clone()), AppStore::new())
    }

    #[test]
    fn test_parse_agent_id() {
        assert_eq!(parse_agent_id(Some("42")).unwrap(), 42);
        assert_eq!(parse_agent_id(Some(" 7 ")).unwrap(), 7);
        for raw in [None, Some(""), Some("abc"), Some("-1"), Some("1.5")] {
            assert!(matches!(parse_agent_id(raw), Err(RunicError::InvalidRoute(_))));
        }
    }

    #[tokio::test]
    async fn test_bad_id_errors_without_remote_call() {
        let canister = MockCanister::new();
        for raw in [None, Some("abc")] {
            let view = view(raw, &canister);
            assert!(matches!(view.state(), AgentViewState::Error(_)));
            let state = view.load().await.unwrap();
            assert_eq!(state, AgentViewState::Error("Invalid or missing id parameter".into()));
        }
        assert!(canister.calls().is_empty());
        assert!(canister.connections().is_empty());
    }

    #[tokio::test]
    async fn test_loads_agent_and_selects_it() {
        let canister = MockCanister::new().with_agent(3, sample_agent("gooad"));
        let view = view(Some("3"), &canister);
        assert_eq!(view.state(), AgentViewState::Loading);

        let state = view.load().await.unwrap();
        assert!(matches!(state, AgentViewState::Loaded(ref agent) if agent.agent_name == "gooad"));
        assert_eq!(view.store.selected_agent(), Some(AgentBy::Id(3)));
        assert_eq!(canister.calls(), vec![MockCall::GetAgentOf(AgentBy::Id(3))]);
    }

    #[tokio::test]
    async fn test_missing_agent_is_not_an_error() {
        let canister = MockCanister::new();
        let view = view(Some("9"), &canister);
        assert_eq!(view.load().await.unwrap(), AgentViewState::NotFound);
    }

    #[tokio::test]
    async fn test_failed_load() {
        let canister = MockCanister::new();
        canister.break_transport("get_agent_of");
        let view = view(Some("1"), &canister);
        assert_eq!(view.load().await.unwrap(), AgentViewState::Error(LOAD_FAILED.into()));
        assert_eq!(
            view.store.warning(),
            Some(RunicError::Transport("connection refused".into()).user_message())
        );
    }

    #[tokio::test]
    async fn test_tab_switch_does_not_refetch() {
        let canister = MockCanister::new().with_agent(1, sample_agent("a"));
        let view = view(Some("1"), &canister);
        view.load().await.unwrap();

        view.select_tab("jackpot".parse().unwrap());
        view.select_tab(AgentTab::Chat);
        assert_eq!(view.tab(), AgentTab::Chat);
        assert_eq!(canister.count("get_agent_of"), 1);
    }

    #[tokio::test]
    async fn test_closed_view_ignores_result() {
        let canister = MockCanister::new().with_agent(1, sample_agent("a"));
        let view = view(Some("1"), &canister);
        view.close();
        assert_eq!(view.load().await, None);
        assert_eq!(view.state(), AgentViewState::Loading);
    }
}
