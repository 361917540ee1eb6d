//! Mock Canister
//!
//! In-memory stand-in for the backend canister. Records every call, can be
//! primed with agents and balances, scripted to fail, or held at a gate so
//! tests can observe in-flight behavior.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use candid::Principal;
use ic_agent::Identity;
use ic_agent::agent::EnvelopeContent;
use ic_agent::identity::Signature;
use tokio::sync::Notify;

use crate::error::{Rejection, Result, RunicError};
use crate::identity::Wallet;
use crate::model::{
    AgentBy, AgentDetails, AgentId, BalanceEntry, BuyArgs, ChatSessionId, CreateAgentArgs,
    LuckyDrawArgs, SellArgs, WithdrawArgs,
};
use crate::service::{CanisterConnector, CanisterService};

/// Identity with a fixed principal that refuses to sign
#[derive(Clone, Debug)]
pub struct TestIdentity {
    principal: Principal,
}

impl TestIdentity {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    /// Deterministic self-authenticating principal derived from `name`
    pub fn named(name: &str) -> Self {
        Self::new(Principal::self_authenticating(name.as_bytes()))
    }

    pub const fn principal(&self) -> Principal {
        self.principal
    }
}

impl Identity for TestIdentity {
    fn sender(&self) -> std::result::Result<Principal, String> {
        Ok(self.principal)
    }

    fn public_key(&self) -> Option<Vec<u8>> {
        None
    }

    fn sign(&self, _content: &EnvelopeContent) -> std::result::Result<Signature, String> {
        Err("test identity cannot sign".into())
    }
}

/// A recorded remote call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
    CreateAgent(CreateAgentArgs),
    GetAgentOf(AgentBy),
    GetAgents,
    CreateChatSession(AgentBy),
    Chat {
        session: ChatSessionId,
        agent: AgentBy,
        message: String,
    },
    Buy(BuyArgs),
    Sell(SellArgs),
    LuckyDraw(LuckyDrawArgs),
    GetBalances,
    GetDepositAddress,
    GetBitcoinBalance,
    Withdraw(WithdrawArgs),
}

impl MockCall {
    /// Candid method name of the call
    pub const fn method(&self) -> &'static str {
        match self {
            Self::CreateAgent(_) => "create_agent",
            Self::GetAgentOf(_) => "get_agent_of",
            Self::GetAgents => "get_agents",
            Self::CreateChatSession(_) => "create_chat_session",
            Self::Chat { .. } => "chat",
            Self::Buy(_) => "buy",
            Self::Sell(_) => "sell",
            Self::LuckyDraw(_) => "lucky_draw",
            Self::GetBalances => "get_balances",
            Self::GetDepositAddress => "get_deposit_address",
            Self::GetBitcoinBalance => "get_bitcoin_balance",
            Self::Withdraw(_) => "withdraw",
        }
    }
}

/// Scripted failure for one method
#[derive(Clone, Debug)]
enum Failure {
    Reject(String),
    Transport(String),
}

impl From<&Failure> for RunicError {
    fn from(failure: &Failure) -> Self {
        match failure {
            Failure::Reject(raw) => Rejection::new(5_u64, raw).into(),
            Failure::Transport(msg) => Self::Transport(msg.clone()),
        }
    }
}

#[derive(Default)]
struct MockState {
    agents: Vec<(AgentId, AgentDetails)>,
    balances: Vec<BalanceEntry>,
    deposit_address: String,
    bitcoin_balance: u64,
    draw_outcome: String,
    next_session: u128,
    failures: HashMap<&'static str, Failure>,
    gates: HashMap<&'static str, Arc<Notify>>,
    calls: Vec<(Option<Principal>, MockCall)>,
    connections: Vec<Option<Principal>>,
}

/// In-memory backend canister
#[derive(Clone, Default)]
pub struct MockCanister {
    state: Arc<Mutex<MockState>>,
}

impl MockCanister {
    pub fn new() -> Self {
        let canister = Self::default();
        {
            let mut state = canister.lock();
            state.deposit_address = "bc1qmockdepositaddress".into();
            state.draw_outcome = "Better luck next time!".into();
            state.next_session = 1;
        }
        canister
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an agent to the catalog
    #[must_use]
    pub fn with_agent(self, id: AgentId, agent: AgentDetails) -> Self {
        self.lock().agents.push((id, agent));
        self
    }

    /// Set the balances returned by `get_balances`
    #[must_use]
    pub fn with_balances(self, balances: Vec<BalanceEntry>) -> Self {
        self.lock().balances = balances;
        self
    }

    /// Set the bitcoin balance returned by `get_bitcoin_balance`
    #[must_use]
    pub fn with_bitcoin_balance(self, sats: u64) -> Self {
        self.lock().bitcoin_balance = sats;
        self
    }

    /// Set the text returned by `lucky_draw`
    #[must_use]
    pub fn with_draw_outcome(self, outcome: impl Into<String>) -> Self {
        self.lock().draw_outcome = outcome.into();
        self
    }

    /// Make `method` reject with the given raw replica text
    pub fn reject(&self, method: &'static str, raw: impl Into<String>) {
        self.lock().failures.insert(method, Failure::Reject(raw.into()));
    }

    /// Make `method` fail at the transport level
    pub fn break_transport(&self, method: &'static str) {
        self.lock()
            .failures
            .insert(method, Failure::Transport("connection refused".into()));
    }

    /// Remove a scripted failure
    pub fn heal(&self, method: &'static str) {
        self.lock().failures.remove(method);
    }

    /// Hold `method` until the returned gate is notified
    pub fn hold(&self, method: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().gates.insert(method, Arc::clone(&gate));
        gate
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.iter().map(|(_, call)| call.clone()).collect()
    }

    /// Calls with the principal they were bound to
    pub fn calls_with_caller(&self) -> Vec<(Option<Principal>, MockCall)> {
        self.lock().calls.clone()
    }

    /// Number of calls made to `method`
    pub fn count(&self, method: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|(_, call)| call.method() == method)
            .count()
    }

    /// Principals of every `connect`, anonymous as `None`
    pub fn connections(&self) -> Vec<Option<Principal>> {
        self.lock().connections.clone()
    }
}

#[async_trait(?Send)]
impl CanisterConnector for MockCanister {
    async fn connect(&self, wallet: Option<&Wallet>) -> Result<Box<dyn CanisterService>> {
        let caller = wallet.map(Wallet::principal);
        self.lock().connections.push(caller);
        Ok(Box::new(MockHandle {
            canister: self.clone(),
            caller,
        }))
    }
}

/// Service handle bound to one caller
struct MockHandle {
    canister: MockCanister,
    caller: Option<Principal>,
}

impl MockHandle {
    /// Record the call, wait at its gate, then apply any scripted failure.
    async fn enter(&self, call: MockCall) -> Result<()> {
        let method = call.method();
        let gate = {
            let mut state = self.canister.lock();
            state.calls.push((self.caller, call));
            state.gates.get(method).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.canister.lock().failures.get(method) {
            Some(failure) => Err(failure.into()),
            None => Ok(()),
        }
    }

    fn caller_required(&self) -> Result<Principal> {
        self.caller
            .ok_or_else(|| Rejection::new(5_u64, "with message: 'Anonymous Identity'").into())
    }
}

#[async_trait(?Send)]
impl CanisterService for MockHandle {
    async fn create_agent(&self, args: CreateAgentArgs) -> Result<AgentId> {
        self.enter(MockCall::CreateAgent(args.clone())).await?;
        let creator = self.caller_required()?;
        let mut state = self.canister.lock();
        let id = state.agents.iter().map(|(id, _)| id + 1).max().unwrap_or(1);
        let mut agent = sample_agent(&args.name);
        agent.description = args.description;
        agent.created_by = creator.to_text();
        agent.ticker = args.ticker.unwrap_or(0);
        agent.website = args.website;
        agent.twitter = args.twitter;
        agent.openchat = args.openchat;
        agent.discord = args.discord;
        state.agents.push((id, agent));
        Ok(id)
    }

    async fn get_agent_of(&self, agent: &AgentBy) -> Result<Option<AgentDetails>> {
        self.enter(MockCall::GetAgentOf(agent.clone())).await?;
        let state = self.canister.lock();
        Ok(state
            .agents
            .iter()
            .find(|(id, details)| match agent {
                AgentBy::Id(wanted) => id == wanted,
                AgentBy::Name(name) => &details.agent_name == name,
            })
            .map(|(_, details)| details.clone()))
    }

    async fn get_agents(&self) -> Result<Vec<(AgentId, AgentDetails)>> {
        self.enter(MockCall::GetAgents).await?;
        Ok(self.canister.lock().agents.clone())
    }

    async fn create_chat_session(&self, agent: &AgentBy) -> Result<ChatSessionId> {
        self.enter(MockCall::CreateChatSession(agent.clone())).await?;
        self.caller_required()?;
        let mut state = self.canister.lock();
        let id = ChatSessionId(state.next_session);
        state.next_session += 1;
        Ok(id)
    }

    async fn chat(&self, session: ChatSessionId, agent: &AgentBy, message: &str) -> Result<String> {
        self.enter(MockCall::Chat {
            session,
            agent: agent.clone(),
            message: message.to_string(),
        })
        .await?;
        Ok(format!("echo: {message}"))
    }

    async fn buy(&self, args: BuyArgs) -> Result<u128> {
        let spend = args.buy_exact_in;
        self.enter(MockCall::Buy(args)).await?;
        self.caller_required()?;
        Ok(spend / 10)
    }

    async fn sell(&self, args: SellArgs) -> Result<u128> {
        let tokens = args.token_amount;
        self.enter(MockCall::Sell(args)).await?;
        self.caller_required()?;
        Ok(tokens * 10)
    }

    async fn lucky_draw(&self, args: LuckyDrawArgs) -> Result<String> {
        self.enter(MockCall::LuckyDraw(args)).await?;
        self.caller_required()?;
        Ok(self.canister.lock().draw_outcome.clone())
    }

    async fn get_balances(&self) -> Result<Vec<BalanceEntry>> {
        self.enter(MockCall::GetBalances).await?;
        self.caller_required()?;
        Ok(self.canister.lock().balances.clone())
    }

    async fn get_deposit_address(&self) -> Result<String> {
        self.enter(MockCall::GetDepositAddress).await?;
        self.caller_required()?;
        Ok(self.canister.lock().deposit_address.clone())
    }

    async fn get_bitcoin_balance(&self) -> Result<u64> {
        self.enter(MockCall::GetBitcoinBalance).await?;
        self.caller_required()?;
        Ok(self.canister.lock().bitcoin_balance)
    }

    async fn withdraw(&self, args: WithdrawArgs) -> Result<u128> {
        let amount = args.amount.minor_units();
        self.enter(MockCall::Withdraw(args)).await?;
        self.caller_required()?;
        Ok(amount)
    }
}

/// A plausible agent record for tests and demos
pub fn sample_agent(name: &str) -> AgentDetails {
    AgentDetails {
        created_at: 1_700_000_000_000_000_000,
        created_by: "2vxsx-fae".into(),
        agent_name: name.into(),
        logo: None,
        runeid: "840000:1".into(),
        ticker: u32::from('R'),
        description: format!("{name} description"),
        website: Some("https://example.org".into()),
        twitter: None,
        openchat: None,
        discord: Some("https://discord.gg/x".into()),
        total_supply: 21_000_000_000,
        holders: 3,
        market_cap: 150_000,
        current_prize_pool: (100_000_000, 5_000),
        current_winner: None,
        txns: (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WithdrawAmount;

    #[tokio::test]
    async fn test_mock_records_calls_per_connection() {
        let canister = MockCanister::new().with_agent(1, sample_agent("a"));
        let service = canister.connect(None).await.unwrap();
        assert_eq!(service.get_agents().await.unwrap().len(), 1);
        assert_eq!(canister.calls(), vec![MockCall::GetAgents]);
        assert_eq!(canister.connections(), vec![None]);
    }

    #[tokio::test]
    async fn test_mock_scripted_rejection() {
        let canister = MockCanister::new();
        canister.reject("get_agents", "Canister trapped with message: 'Paused'");
        let service = canister.connect(None).await.unwrap();
        let err = service.get_agents().await.unwrap_err();
        assert_eq!(err.user_message(), "Paused");

        canister.heal("get_agents");
        assert!(service.get_agents().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_anonymous_cannot_trade() {
        let canister = MockCanister::new();
        let service = canister.connect(None).await.unwrap();
        let err = service
            .buy(BuyArgs {
                id: AgentBy::Id(1),
                amount_out_min: 0,
                buy_exact_in: 100,
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Anonymous Identity");
    }

    #[tokio::test]
    async fn test_mock_withdraw_confirms_amount() {
        let canister = MockCanister::new();
        let wallet = Wallet::from_identity(Arc::new(TestIdentity::named("alice"))).unwrap();
        let service = canister.connect(Some(&wallet)).await.unwrap();
        let sent = service
            .withdraw(WithdrawArgs {
                destination: "bc1qexample".into(),
                amount: WithdrawAmount::Bitcoin { amount: 2_500 },
            })
            .await
            .unwrap();
        assert_eq!(sent, 2_500);
        assert_eq!(canister.count("withdraw"), 1);
    }
}
