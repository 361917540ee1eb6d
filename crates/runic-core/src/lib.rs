//! # runic-core
//!
//! Domain model, backend-canister contract and UI-agnostic view controllers
//! for the runic-agent front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Views (web crate)                     │
//! │   Navbar   Home   Agent[market|jackpot|chat]   Vault  Warning│
//! └──────┬───────────────┬──────────────────────────────┬────────┘
//!        │ render        │ drive                        │ subscribe
//! ┌──────▼─────────┐ ┌───▼──────────────────┐  ┌────────▼───────┐
//! │  NavbarModel   │ │  View controllers    │──│    AppStore    │
//! │                │ │  (ViewScope-guarded) │  │ (watch channel)│
//! └────────────────┘ └───┬──────────────────┘  └────────▲───────┘
//!                        │ connect(wallet) per call      │
//! ┌──────────────────────▼───────────┐  ┌────────────────┴───────┐
//! │  CanisterConnector / Service     │  │ AuthSession            │
//! │  (ic-agent client, or the mock)  │  │ + IdentityProvider     │
//! └──────────────────────────────────┘  └────────────────────────┘
//! ```
//!
//! The backend canister owns every entity. The front end only holds
//! transient copies and re-fetches on mount or on user action.

pub mod amount;
pub mod config;
pub mod error;
pub mod identity;
pub mod mock;
pub mod model;
pub mod service;
pub mod session;
pub mod store;
pub mod task;
pub mod views;

pub use amount::Denomination;
pub use config::ClientConfig;
pub use error::{ErrorKind, RejectCode, Rejection, Result, RunicError};
pub use identity::{IdentityProvider, Wallet};
pub use model::{
    AgentBy, AgentDetails, AgentId, BalanceEntry, BuyArgs, ChatArgs, ChatSessionId,
    CreateAgentArgs, LuckyDrawArgs, SellArgs, WithdrawAmount, WithdrawArgs,
};
pub use service::{CanisterConnector, CanisterService};
pub use session::AuthSession;
pub use store::{AppState, AppStore, AuthState, BalanceStatus, WalletSummary};
pub use task::{ScopeHandle, ViewScope};
