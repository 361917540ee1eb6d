//! Agent Chat
//!
//! ```text
//!   open() ──▶ create_chat_session ──▶ store (wallet, agent) ─▶ id
//!   send_message(text) ──▶ chat(id, agent, text) ──▶ You / AI lines
//! ```
//!
//! The session is created lazily the first time the box is opened with a
//! connected wallet. Until it exists, sending is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::model::{AgentBy, ChatSessionId};
use crate::service::CanisterConnector;
use crate::store::{AppStore, ChatSessionKey};
use crate::task::{ScopeHandle, ViewScope};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    You,
    Ai,
}

impl Speaker {
    pub const fn label(self) -> &'static str {
        match self {
            Self::You => "You",
            Self::Ai => "AI",
        }
    }
}

/// One transcript line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatLine {
    fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// Chat tab controller
pub struct ChatBox {
    agent: AgentBy,
    connector: Arc<dyn CanisterConnector>,
    store: AppStore,
    scope: ViewScope,
    transcript: RwLock<Vec<ChatLine>>,
    sending: AtomicBool,
}

impl ChatBox {
    pub fn new(agent: AgentBy, connector: Arc<dyn CanisterConnector>, store: AppStore) -> Self {
        Self {
            agent,
            connector,
            store,
            scope: ViewScope::new(),
            transcript: RwLock::new(Vec::new()),
            sending: AtomicBool::new(false),
        }
    }

    pub fn scope(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn transcript(&self) -> Vec<ChatLine> {
        self.transcript.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Session for the connected wallet, if one is open
    pub fn session(&self) -> Option<ChatSessionId> {
        self.store.chat_session_for(&self.agent)
    }

    /// Open the session for this agent, creating it on first use.
    ///
    /// `None` when no wallet is connected, creation failed (reported as a
    /// warning), or the view closed first.
    pub async fn open(&self) -> Option<ChatSessionId> {
        if let Some(id) = self.session() {
            return Some(id);
        }
        let wallet = self.store.wallet()?;

        let created = self
            .scope
            .handle()
            .guard(async {
                self.connector
                    .connect(Some(&wallet))
                    .await?
                    .create_chat_session(&self.agent)
                    .await
            })
            .await?;

        match created {
            Ok(id) => self.scope.handle().apply(|| {
                tracing::info!(agent = %self.agent, session = %id, "chat session created");
                let key = ChatSessionKey {
                    wallet: wallet.principal(),
                    agent: self.agent.clone(),
                };
                self.store.set_chat_session(key, id).then_some(id)
            })?,
            Err(e) => {
                self.scope.handle().apply(|| self.store.report(&e));
                None
            }
        }
    }

    /// Send one message.
    ///
    /// Blank input, a missing session or a send already in flight do
    /// nothing. Both lines are appended once the reply arrives; `Some(reply)`
    /// tells the caller to clear its input.
    pub async fn send_message(&self, text: &str) -> Option<String> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }
        let Some(session) = self.session() else {
            tracing::debug!(agent = %self.agent, "chat message dropped: no session");
            return None;
        };
        let wallet = self.store.wallet()?;
        if self.sending.swap(true, Ordering::AcqRel) {
            return None;
        }

        let reply = self
            .scope
            .handle()
            .guard(async {
                self.connector
                    .connect(Some(&wallet))
                    .await?
                    .chat(session, &self.agent, message)
                    .await
            })
            .await;
        self.sending.store(false, Ordering::Release);

        match reply? {
            Ok(reply) => self.scope.handle().apply(|| {
                let mut transcript = self.transcript.write().unwrap_or_else(PoisonError::into_inner);
                transcript.push(ChatLine::new(Speaker::You, message));
                transcript.push(ChatLine::new(Speaker::Ai, reply.clone()));
                reply
            }),
            Err(e) => {
                self.scope.handle().apply(|| self.store.report(&e));
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
    use crate::mock::{MockCall, MockCanister, TestIdentity};

    fn chat_box(canister: &MockCanister, signed_in: bool) -> ChatBox {
        let store = AppStore::new();
        if signed_in {
            store.sign_in(Wallet::from_identity(Arc::new(TestIdentity::named("alice"))).unwrap());
        }
        ChatBox::new(AgentBy::Id(4), Arc::new(canister.clone()), store)
    }

    #[tokio::test]
    async fn test_session_created_once() {
        let canister = MockCanister::new();
        let chat = chat_box(&canister, true);

        let first = chat.open().await.unwrap();
        let again = chat.open().await.unwrap();
        assert_eq!(first, again);
        assert_eq!(canister.count("create_chat_session"), 1);
        assert_eq!(chat.store.chat_session_for(&AgentBy::Id(4)), Some(first));
    }

    #[tokio::test]
    async fn test_send_appends_both_lines() {
        let canister = MockCanister::new();
        let chat = chat_box(&canister, true);
        let session = chat.open().await.unwrap();

        let reply = chat.send_message("  hello  ").await.unwrap();
        assert_eq!(reply, "echo: hello");
        assert_eq!(
            chat.transcript(),
            vec![ChatLine::new(Speaker::You, "hello"), ChatLine::new(Speaker::Ai, "echo: hello")]
        );
        assert!(canister.calls().contains(&MockCall::Chat {
            session,
            agent: AgentBy::Id(4),
            message: "hello".into(),
        }));
    }

    #[tokio::test]
    async fn test_send_without_session_is_a_noop() {
        let canister = MockCanister::new();
        let chat = chat_box(&canister, true);
        assert_eq!(chat.send_message("hi").await, None);

        chat.open().await.unwrap();
        assert_eq!(chat.send_message("   ").await, None);
        assert_eq!(canister.count("chat"), 0);
        assert!(chat.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_open_does_nothing() {
        let canister = MockCanister::new();
        let chat = chat_box(&canister, false);
        assert_eq!(chat.open().await, None);
        assert!(canister.calls().is_empty());
    }

    #[tokio::test]
    async fn test_session_failure_is_reported() {
        let canister = MockCanister::new();
        canister.reject("create_chat_session", "with message: 'Agent is offline'");
        let chat = chat_box(&canister, true);

        assert_eq!(chat.open().await, None);
        assert_eq!(chat.store.warning().as_deref(), Some("Agent is offline"));
        assert_eq!(chat.send_message("hi").await, None);
    }

    #[tokio::test]
    async fn test_failed_reply_keeps_transcript() {
        let canister = MockCanister::new();
        let chat = chat_box(&canister, true);
        chat.open().await.unwrap();
        canister.break_transport("chat");

        assert_eq!(chat.send_message("hi").await, None);
        assert!(chat.transcript().is_empty());
        assert!(chat.store.warning().is_some());
        assert!(!chat.is_sending());
    }

    #[tokio::test]
    async fn test_logout_drops_session() {
        let canister = MockCanister::new();
        let chat = chat_box(&canister, true);
        chat.open().await.unwrap();

        chat.store.sign_out();
        assert_eq!(chat.session(), None);
        assert_eq!(chat.send_message("hi").await, None);
    }

    #[tokio::test]
    async fn test_reopen_follows_wallet_changes() {
        let canister = MockCanister::new();
        let chat = chat_box(&canister, false);
        assert_eq!(chat.open().await, None);

        chat.store
            .sign_in(Wallet::from_identity(Arc::new(TestIdentity::named("bob"))).unwrap());
        let session = chat.open().await.unwrap();
        assert_eq!(chat.session(), Some(session));
        assert_eq!(chat.send_message("gm").await.as_deref(), Some("echo: gm"));

        chat.store.sign_out();
        assert_eq!(chat.open().await, None);
        assert_eq!(chat.session(), None);
        assert_eq!(canister.count("create_chat_session"), 1);
    }
}
