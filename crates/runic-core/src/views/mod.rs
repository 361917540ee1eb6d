//! View Controllers
//!
//! Each page or panel of the front end has a controller here holding its
//! remote-call lifecycle and local state. Controllers are UI-toolkit agnostic:
//! the web crate renders them, tests drive them against the mock canister.

pub mod agent_detail;
pub mod catalog;
pub mod chat;
pub mod create_agent;
pub mod jackpot;
pub mod market;
pub mod navbar;
pub mod vault;

pub use agent_detail::{AgentTab, AgentView, AgentViewState, parse_agent_id};
pub use catalog::{AGENT_REFRESH_INTERVAL, AgentCatalog, agent_href};
pub use chat::{ChatBox, ChatLine, Speaker};
pub use create_agent::{AgentCreator, AgentDraft, LogoUpload, MAX_LOGO_BYTES};
pub use jackpot::{JackpotPanel, JackpotStatus};
pub use market::{MarketPanel, TradeForm, TradeOrder, TradeSide};
pub use navbar::NavbarModel;
pub use vault::{BalanceRow, VaultState, VaultView};
