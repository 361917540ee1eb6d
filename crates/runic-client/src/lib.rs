//! # runic-client
//!
//! [`CanisterConnector`](runic_core::CanisterConnector) backed by `ic-agent`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use runic_client::IcConnector;
//!
//! let connector = IcConnector::from_env()?;
//! let agents = connector.connect(None).await?.get_agents().await?;
//! ```
//!
//! Every `connect` builds a new agent bound to the given wallet; nothing is
//! pooled between calls.

pub mod canister;
pub mod connector;
pub mod reject;

pub use canister::IcCanister;
pub use connector::IcConnector;
pub use reject::map_agent_error;

// Re-export core types for convenience
pub use runic_core::{CanisterConnector, CanisterService, ClientConfig, Result, RunicError};
