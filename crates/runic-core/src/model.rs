//! Canister Data Model
//!
//! Candid types exchanged with the backend canister. Everything here is owned
//! by the canister; the front end only holds transient copies.

use candid::{CandidType, Nat, Principal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::{Denomination, format_digits};

/// Numeric agent identifier assigned by the canister
pub type AgentId = u128;

/// Selects an agent either by id or by name
#[derive(CandidType, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentBy {
    Id(AgentId),
    Name(String),
}

impl AgentBy {
    /// The numeric id, when selecting by id
    pub const fn id(&self) -> Option<AgentId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(_) => None,
        }
    }
}

impl From<AgentId> for AgentBy {
    fn from(id: AgentId) -> Self {
        Self::Id(id)
    }
}

impl std::fmt::Display for AgentBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Public view of an agent as returned by `get_agent_of` / `get_agents`
#[derive(CandidType, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AgentDetails {
    /// Creation time, nanoseconds since the epoch
    pub created_at: u64,
    pub created_by: String,
    pub agent_name: String,
    /// URL of the logo asset served by the canister
    pub logo: Option<String>,
    pub runeid: String,
    pub ticker: u32,
    pub description: String,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub openchat: Option<String>,
    pub discord: Option<String>,
    pub total_supply: u128,
    pub holders: u32,
    /// Market cap in bitcoin minor units
    pub market_cap: u64,
    /// (bitcoin, rune) prize pool in minor units
    pub current_prize_pool: (u64, u128),
    pub current_winner: Option<Principal>,
    /// (etching, reveal) transaction ids
    pub txns: (Option<String>, Option<String>),
}

impl AgentDetails {
    /// Creation time as a UTC timestamp
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(i64::try_from(self.created_at).unwrap_or(i64::MAX))
    }

    /// Display symbol for the agent token.
    ///
    /// The canister stores the ticker as a code point; unprintable values fall
    /// back to the agent name.
    pub fn symbol(&self) -> String {
        char::from_u32(self.ticker)
            .filter(|c| !c.is_control() && !c.is_whitespace())
            .map_or_else(|| self.agent_name.clone(), String::from)
    }

    /// Market cap formatted in bitcoin
    pub fn market_cap_display(&self) -> String {
        Denomination::Bitcoin.format_minor(u128::from(self.market_cap))
    }

    /// Social links that are set, labelled
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        [
            ("Website", &self.website),
            ("Twitter", &self.twitter),
            ("Discord", &self.discord),
            ("OpenChat", &self.openchat),
        ]
        .into_iter()
        .filter_map(|(label, link)| link.as_deref().map(|l| (label, l)))
        .collect()
    }
}

/// Arguments for `create_agent`
#[derive(CandidType, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CreateAgentArgs {
    pub name: String,
    pub ticker: Option<u32>,
    /// Data URI of the logo image
    pub logo: Option<String>,
    pub description: String,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub openchat: Option<String>,
    pub discord: Option<String>,
}

/// Arguments for `buy`: spend exactly `buy_exact_in` bitcoin minor units
#[derive(CandidType, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BuyArgs {
    pub id: AgentBy,
    pub amount_out_min: u128,
    pub buy_exact_in: u128,
}

/// Arguments for `sell`: sell `token_amount` rune minor units
#[derive(CandidType, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SellArgs {
    pub id: AgentBy,
    pub token_amount: u128,
    pub amount_collateral_min: u128,
}

/// Arguments for `lucky_draw`
#[derive(CandidType, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LuckyDrawArgs {
    pub id: AgentBy,
    pub message: String,
}

/// Arguments for `chat`
#[derive(CandidType, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatArgs {
    pub agent: AgentBy,
    pub session_id: u128,
    pub message: String,
}

/// Chat session handle issued by `create_chat_session`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatSessionId(pub u128);

impl std::fmt::Display for ChatSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset and amount for `withdraw`
#[derive(CandidType, Clone, Debug, PartialEq, Eq, Deserialize)]
pub enum WithdrawAmount {
    /// Agent rune tokens, in minor units
    Rune { runeid: AgentBy, amount: u128 },
    /// Satoshis
    Bitcoin { amount: u64 },
}

impl WithdrawAmount {
    /// Requested amount in minor units
    pub fn minor_units(&self) -> u128 {
        match self {
            Self::Rune { amount, .. } => *amount,
            Self::Bitcoin { amount } => u128::from(*amount),
        }
    }
}

/// Arguments for `withdraw`
#[derive(CandidType, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WithdrawArgs {
    /// Destination bitcoin address
    pub destination: String,
    pub amount: WithdrawAmount,
}

/// One row of `get_balances`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceEntry {
    pub token: String,
    pub amount: Nat,
}

impl BalanceEntry {
    pub fn new(token: impl Into<String>, amount: impl Into<Nat>) -> Self {
        Self {
            token: token.into(),
            amount: amount.into(),
        }
    }

    pub fn denomination(&self) -> Denomination {
        Denomination::for_token_name(&self.token)
    }

    /// Amount rendered with the decimals of its denomination
    pub fn display_amount(&self) -> String {
        format_digits(&self.amount.0.to_str_radix(10), self.denomination().decimals())
    }
}
