//! Backend Canister Handle
//!
//! Candid encoding of every backend method. The methods in
//! [`QUERY_METHODS`] are queries; the rest are replicated updates.

use async_trait::async_trait;
use candid::utils::ArgumentEncoder;
use candid::{CandidType, Nat, Principal};
use ic_agent::Agent;
use runic_core::{
    AgentBy, AgentDetails, AgentId, BalanceEntry, BuyArgs, CanisterService, ChatArgs,
    ChatSessionId, CreateAgentArgs, LuckyDrawArgs, Result, SellArgs, WithdrawArgs,
};
use serde::de::DeserializeOwned;

use crate::reject::map_agent_error;

/// Backend methods the canister interface marks as queries
pub const QUERY_METHODS: [&str; 5] = [
    "get_agent_of",
    "get_agents",
    "get_balances",
    "get_deposit_address",
    "get_bitcoin_balance",
];

/// How a backend method is invoked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Update,
}

impl CallKind {
    pub fn of(method: &str) -> Self {
        if QUERY_METHODS.contains(&method) {
            Self::Query
        } else {
            Self::Update
        }
    }
}

/// Agent bound to one caller and the backend canister
pub struct IcCanister {
    agent: Agent,
    canister_id: Principal,
}

impl IcCanister {
    pub const fn new(agent: Agent, canister_id: Principal) -> Self {
        Self { agent, canister_id }
    }

    pub const fn canister_id(&self) -> Principal {
        self.canister_id
    }

    async fn call<A, R>(&self, method: &str, args: A) -> Result<R>
    where
        A: ArgumentEncoder,
        R: CandidType + DeserializeOwned,
    {
        let arg = candid::encode_args(args)?;
        let kind = CallKind::of(method);
        tracing::debug!(method, ?kind, "canister call");
        let bytes = match kind {
            CallKind::Query => {
                self.agent
                    .query(&self.canister_id, method)
                    .with_arg(arg)
                    .call()
                    .await
            }
            CallKind::Update => {
                self.agent
                    .update(&self.canister_id, method)
                    .with_arg(arg)
                    .call_and_wait()
                    .await
            }
        }
        .map_err(map_agent_error)?;
        Ok(candid::decode_one(&bytes)?)
    }

    /// Full catalog; also used by the server health probe
    pub async fn list_agents(&self) -> Result<Vec<(AgentId, AgentDetails)>> {
        self.call("get_agents", ()).await
    }
}

#[async_trait(?Send)]
impl CanisterService for IcCanister {
    async fn create_agent(&self, args: CreateAgentArgs) -> Result<AgentId> {
        let id: Nat = self.call("create_agent", (args,)).await?;
        nat_to_u128(&id)
    }

    async fn get_agent_of(&self, agent: &AgentBy) -> Result<Option<AgentDetails>> {
        self.call("get_agent_of", (agent,)).await
    }

    async fn get_agents(&self) -> Result<Vec<(AgentId, AgentDetails)>> {
        self.list_agents().await
    }

    async fn create_chat_session(&self, agent: &AgentBy) -> Result<ChatSessionId> {
        let id: Nat = self.call("create_chat_session", (agent,)).await?;
        nat_to_u128(&id).map(ChatSessionId)
    }

    async fn chat(&self, session: ChatSessionId, agent: &AgentBy, message: &str) -> Result<String> {
        let args = ChatArgs {
            agent: agent.clone(),
            session_id: session.0,
            message: message.to_string(),
        };
        self.call("chat", (args,)).await
    }

    async fn buy(&self, args: BuyArgs) -> Result<u128> {
        let received: Nat = self.call("buy", (args,)).await?;
        nat_to_u128(&received)
    }

    async fn sell(&self, args: SellArgs) -> Result<u128> {
        let received: Nat = self.call("sell", (args,)).await?;
        nat_to_u128(&received)
    }

    async fn lucky_draw(&self, args: LuckyDrawArgs) -> Result<String> {
        self.call("lucky_draw", (args,)).await
    }

    async fn get_balances(&self) -> Result<Vec<BalanceEntry>> {
        let rows: Vec<(String, Nat)> = self.call("get_balances", ()).await?;
        Ok(rows
            .into_iter()
            .map(|(token, amount)| BalanceEntry::new(token, amount))
            .collect())
    }

    async fn get_deposit_address(&self) -> Result<String> {
        self.call("get_deposit_address", ()).await
    }

    async fn get_bitcoin_balance(&self) -> Result<u64> {
        self.call("get_bitcoin_balance", ()).await
    }

    async fn withdraw(&self, args: WithdrawArgs) -> Result<u128> {
        let confirmed: Nat = self
            .call("withdraw", (args.destination, args.amount))
            .await?;
        nat_to_u128(&confirmed)
    }
}

fn nat_to_u128(value: &Nat) -> Result<u128> {
    u128::try_from(&value.0)
        .map_err(|_| runic_core::RunicError::Other(format!("{value} does not fit in 128 bits")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nat_conversion() {
        assert_eq!(nat_to_u128(&Nat::from(42_u64)).unwrap(), 42);
        let huge: Nat = "340282366920938463463374607431768211456".parse().unwrap();
        assert!(nat_to_u128(&huge).is_err());
    }

    #[test]
    fn test_call_kinds_follow_interface() {
        assert_eq!(CallKind::of("get_deposit_address"), CallKind::Query);
        assert_eq!(CallKind::of("get_bitcoin_balance"), CallKind::Query);
        assert_eq!(CallKind::of("get_agents"), CallKind::Query);
        assert_eq!(CallKind::of("create_chat_session"), CallKind::Update);
        assert_eq!(CallKind::of("withdraw"), CallKind::Update);
    }

    #[test]
    fn test_chat_args_encode_as_one_record() {
        let args = ChatArgs {
            agent: AgentBy::Id(1),
            session_id: 7,
            message: "hi".into(),
        };
        let bytes = candid::encode_args((args.clone(),)).unwrap();
        let decoded: ChatArgs = candid::decode_one(&bytes).unwrap();
        assert_eq!(decoded, args);
    }
}
