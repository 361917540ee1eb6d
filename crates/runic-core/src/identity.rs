//! Wallet Identity
//!
//! A [`Wallet`] is a signing identity that is known not to be anonymous.
//! Login providers hand back raw `ic_agent` identities; only
//! [`Wallet::from_identity`] turns them into something the store accepts.

use std::sync::Arc;

use async_trait::async_trait;
use candid::Principal;
use ic_agent::Identity;

use crate::error::{Result, RunicError};

/// Authenticated signing identity
#[derive(Clone)]
pub struct Wallet {
    principal: Principal,
    identity: Arc<dyn Identity>,
}

impl Wallet {
    /// Accept a login result.
    ///
    /// The anonymous principal is a failed login, not a wallet.
    pub fn from_identity(identity: Arc<dyn Identity>) -> Result<Self> {
        let principal = identity.sender().map_err(RunicError::LoginFailed)?;
        if principal == Principal::anonymous() {
            return Err(RunicError::AnonymousIdentity);
        }
        Ok(Self { principal, identity })
    }

    pub const fn principal(&self) -> Principal {
        self.principal
    }

    /// Identity used to sign calls
    pub fn identity(&self) -> Arc<dyn Identity> {
        Arc::clone(&self.identity)
    }

    /// Shortened principal for display, e.g. `abcde…xyz`
    pub fn short_principal(&self) -> String {
        let text = self.principal.to_text();
        match (text.get(..5), text.len().checked_sub(3).and_then(|start| text.get(start..))) {
            (Some(head), Some(tail)) if text.len() > 12 => format!("{head}…{tail}"),
            _ => text,
        }
    }
}

impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        self.principal == other.principal
    }
}

impl Eq for Wallet {}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("principal", &self.principal.to_text())
            .finish_non_exhaustive()
    }
}

/// External login flow (Internet Identity, a PEM file, a test double, ...)
#[async_trait(?Send)]
pub trait IdentityProvider: Send + Sync {
    /// Run the login flow. `Ok(None)` means the user closed it.
    async fn login(&self) -> Result<Option<Arc<dyn Identity>>>;

    /// Forget the provider-side session
    async fn logout(&self) -> Result<()>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
