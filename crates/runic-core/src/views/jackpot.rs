//! Jackpot ("Bait the Bot")
//!
//! Users send the agent a message through `lucky_draw`; the canister decides
//! whether it wins the prize pool. Once a winner exists no further draw is
//! issued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use candid::Principal;

use crate::amount::Denomination;
use crate::error::RunicError;
use crate::model::{AgentBy, AgentDetails, LuckyDrawArgs};
use crate::service::CanisterConnector;
use crate::store::AppStore;
use crate::task::{ScopeHandle, ViewScope};

/// Prize pool as shown on the panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JackpotStatus {
    Open { bitcoin: String, rune: String },
    Claimed(Principal),
}

impl JackpotStatus {
    pub fn of(agent: &AgentDetails) -> Self {
        if let Some(winner) = agent.current_winner {
            return Self::Claimed(winner);
        }
        let (bitcoin, rune) = agent.current_prize_pool;
        Self::Open {
            bitcoin: Denomination::Bitcoin.format_minor(u128::from(bitcoin)),
            rune: Denomination::Rune.format_minor(rune),
        }
    }

    /// Banner text when the jackpot is gone
    pub fn claimed_notice(&self) -> Option<String> {
        match self {
            Self::Claimed(winner) => Some(format!("Jackpot already claimed by user: {winner}")),
            Self::Open { .. } => None,
        }
    }
}

/// Controller of the jackpot tab
pub struct JackpotPanel {
    agent: AgentBy,
    status: JackpotStatus,
    connector: Arc<dyn CanisterConnector>,
    store: AppStore,
    scope: ViewScope,
    busy: AtomicBool,
}

impl JackpotPanel {
    pub fn new(
        agent: AgentBy,
        details: &AgentDetails,
        connector: Arc<dyn CanisterConnector>,
        store: AppStore,
    ) -> Self {
        Self {
            agent,
            status: JackpotStatus::of(details),
            connector,
            store,
            scope: ViewScope::new(),
            busy: AtomicBool::new(false),
        }
    }

    pub const fn status(&self) -> &JackpotStatus {
        &self.status
    }

    pub fn scope(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// One draw attempt.
    ///
    /// The canister's outcome text is shown verbatim as the notice and
    /// returned.
    pub async fn attempt(&self, message: &str) -> Option<String> {
        if let Some(notice) = self.status.claimed_notice() {
            self.store.set_warning(notice);
            return None;
        }
        let message = message.trim();
        if message.is_empty() {
            self.store
                .report(&RunicError::Validation("Write a message for the bot first".into()));
            return None;
        }
        let Some(wallet) = self.store.wallet() else {
            self.store.report(&RunicError::NotAuthenticated);
            return None;
        };
        if self.busy.swap(true, Ordering::AcqRel) {
            return None;
        }

        let args = LuckyDrawArgs {
            id: self.agent.clone(),
            message: message.to_string(),
        };
        let outcome = self
            .scope
            .handle()
            .guard(async {
                self.connector
                    .connect(Some(&wallet))
                    .await?
                    .lucky_draw(args)
                    .await
            })
            .await;
        self.busy.store(false, Ordering::Release);

        match outcome? {
            Ok(outcome) => self.scope.handle().apply(|| {
                tracing::info!(agent = %self.agent, "lucky draw: {outcome}");
                self.store.set_warning(outcome.clone());
                outcome
            }),
            Err(e) => {
                self.store.report(&e);
                None
            }
        }
    }

    pub fn close(&self) {
        self.scope.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Wallet;
    use crate::mock::{MockCall, MockCanister, TestIdentity, sample_agent};

    fn panel(canister: &MockCanister, details: &AgentDetails) -> JackpotPanel {
        let store = AppStore::new();
        store.sign_in(Wallet::from_identity(Arc::new(TestIdentity::named("alice"))).unwrap());
        JackpotPanel::new(AgentBy::Id(2), details, Arc::new(canister.clone()), store)
    }

    #[test]
    fn test_prize_formatting() {
        let status = JackpotStatus::of(&sample_agent("a"));
        assert_eq!(
            status,
            JackpotStatus::Open {
                bitcoin: "1.00000000".into(),
                rune: "5.000".into(),
            }
        );
        assert_eq!(status.claimed_notice(), None);
    }

    #[tokio::test]
    async fn test_outcome_shown_verbatim() {
        let canister = MockCanister::new().with_draw_outcome("You won the jackpot!");
        let panel = panel(&canister, &sample_agent("a"));

        let outcome = panel.attempt("please pay me").await.unwrap();
        assert_eq!(outcome, "You won the jackpot!");
        assert_eq!(panel.store.warning().as_deref(), Some("You won the jackpot!"));
        assert_eq!(
            canister.calls(),
            vec![MockCall::LuckyDraw(LuckyDrawArgs {
                id: AgentBy::Id(2),
                message: "please pay me".into(),
            })]
        );
    }

    #[tokio::test]
    async fn test_claimed_jackpot_issues_no_draw() {
        let canister = MockCanister::new();
        let mut details = sample_agent("a");
        let winner = TestIdentity::named("bob").principal();
        details.current_winner = Some(winner);
        let panel = panel(&canister, &details);

        assert_eq!(panel.status(), &JackpotStatus::Claimed(winner));
        assert_eq!(panel.attempt("hi").await, None);
        assert_eq!(
            panel.store.warning(),
            Some(format!("Jackpot already claimed by user: {winner}"))
        );
        assert!(canister.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_message_rejected_locally() {
        let canister = MockCanister::new();
        let panel = panel(&canister, &sample_agent("a"));
        assert_eq!(panel.attempt("   ").await, None);
        assert!(panel.store.warning().is_some());
        assert!(canister.calls().is_empty());
    }
}
