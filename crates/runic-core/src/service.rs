//! Canister Service Contract
//!
//! [`CanisterService`] is the typed RPC surface of the backend canister.
//! [`CanisterConnector`] builds a fresh service handle for every call, bound to
//! the wallet that is current at that moment (or anonymous). Handles are never
//! cached or shared between calls.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let service = connector.connect(store.wallet().as_ref()).await?;
//! let agents = service.get_agents().await?;
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::identity::Wallet;
use crate::model::{
    AgentBy, AgentDetails, AgentId, BalanceEntry, BuyArgs, ChatSessionId, CreateAgentArgs,
    LuckyDrawArgs, SellArgs, WithdrawArgs,
};

/// Remote operations exposed by the backend canister
#[async_trait(?Send)]
pub trait CanisterService: Send + Sync {
    /// Create an agent, returning its id
    async fn create_agent(&self, args: CreateAgentArgs) -> Result<AgentId>;

    /// Look up one agent. `Ok(None)` means it does not exist.
    async fn get_agent_of(&self, agent: &AgentBy) -> Result<Option<AgentDetails>>;

    /// Full catalog in canister order
    async fn get_agents(&self) -> Result<Vec<(AgentId, AgentDetails)>>;

    /// Open a chat session for the caller with this agent
    async fn create_chat_session(&self, agent: &AgentBy) -> Result<ChatSessionId>;

    /// Send one chat message, returning the bot reply
    async fn chat(&self, session: ChatSessionId, agent: &AgentBy, message: &str) -> Result<String>;

    /// Spend bitcoin for agent tokens, returning tokens received (minor units)
    async fn buy(&self, args: BuyArgs) -> Result<u128>;

    /// Sell agent tokens, returning bitcoin received (minor units)
    async fn sell(&self, args: SellArgs) -> Result<u128>;

    /// One jackpot attempt; the outcome text is shown verbatim
    async fn lucky_draw(&self, args: LuckyDrawArgs) -> Result<String>;

    /// Caller balances, one row per token
    async fn get_balances(&self) -> Result<Vec<BalanceEntry>>;

    /// Caller's bitcoin deposit address
    async fn get_deposit_address(&self) -> Result<String>;

    /// Caller's bitcoin balance (satoshis)
    async fn get_bitcoin_balance(&self) -> Result<u64>;

    /// Withdraw to an external address, returning the confirmed amount
    async fn withdraw(&self, args: WithdrawArgs) -> Result<u128>;
}

/// Builds service handles bound to an identity
#[async_trait(?Send)]
pub trait CanisterConnector: Send + Sync {
    /// New handle for `wallet`, or anonymous when `None`
    async fn connect(&self, wallet: Option<&Wallet>) -> Result<Box<dyn CanisterService>>;
}
