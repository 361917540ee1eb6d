//! Internet Identity Adapter
//!
//! The login window runs in `js/auth.js`. It hands back the session key as a
//! PKCS#8 PEM and the delegation chain with base64 fields; both are turned
//! into an `ic-agent` [`DelegatedIdentity`] here.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use candid::Principal;
use ic_agent::Identity;
use ic_agent::identity::{BasicIdentity, DelegatedIdentity, Delegation, SignedDelegation};
use runic_core::{IdentityProvider, Result, RunicError};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/auth.js")]
extern "C" {
    /// Resolves to the delegation bundle as JSON, or `null` if the window was closed
    #[wasm_bindgen(catch, js_name = iiLogin)]
    async fn ii_login(provider_url: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = iiLogout)]
    async fn ii_logout() -> std::result::Result<JsValue, JsValue>;
}

/// One link of the delegation chain
#[derive(Debug, Deserialize)]
struct ChainLink {
    pubkey: String,
    /// Nanoseconds since the epoch, as a decimal string
    expiration: String,
    #[serde(default)]
    targets: Option<Vec<String>>,
    signature: String,
}

/// What `iiLogin` resolves to
#[derive(Debug, Deserialize)]
struct DelegationBundle {
    session_key_pem: String,
    public_key: String,
    delegations: Vec<ChainLink>,
}

fn decode(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| RunicError::LoginFailed(format!("bad {field}: {e}")))
}

impl ChainLink {
    fn into_signed(self) -> Result<SignedDelegation> {
        let expiration = self
            .expiration
            .parse()
            .map_err(|e| RunicError::LoginFailed(format!("bad expiration: {e}")))?;
        let targets = self
            .targets
            .map(|targets| {
                targets
                    .iter()
                    .map(Principal::from_text)
                    .collect::<std::result::Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|e| RunicError::LoginFailed(format!("bad target: {e}")))?;

        Ok(SignedDelegation {
            delegation: Delegation {
                pubkey: decode("pubkey", &self.pubkey)?,
                expiration,
                targets,
            },
            signature: decode("signature", &self.signature)?,
        })
    }
}

impl DelegationBundle {
    fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RunicError::LoginFailed(format!("bad delegation: {e}")))
    }

    fn into_identity(self) -> Result<DelegatedIdentity> {
        let session = BasicIdentity::from_pem(self.session_key_pem.as_bytes())
            .map_err(|e| RunicError::LoginFailed(format!("bad session key: {e}")))?;
        let chain = self
            .delegations
            .into_iter()
            .map(ChainLink::into_signed)
            .collect::<Result<Vec<_>>>()?;
        Ok(DelegatedIdentity::new(
            decode("public_key", &self.public_key)?,
            Box::new(session),
            chain,
        ))
    }
}

/// Internet Identity login flow
pub struct InternetIdentity {
    provider_url: String,
}

impl InternetIdentity {
    pub fn new(provider_url: impl Into<String>) -> Self {
        Self {
            provider_url: provider_url.into(),
        }
    }
}

#[async_trait(?Send)]
impl IdentityProvider for InternetIdentity {
    async fn login(&self) -> Result<Option<Arc<dyn Identity>>> {
        let value = ii_login(&self.provider_url)
            .await
            .map_err(|e| RunicError::LoginFailed(format!("{e:?}")))?;
        let Some(json) = value.as_string() else {
            return Ok(None);
        };
        let identity = DelegationBundle::parse(&json)?.into_identity()?;
        Ok(Some(Arc::new(identity)))
    }

    async fn logout(&self) -> Result<()> {
        ii_logout()
            .await
            .map(|_| ())
            .map_err(|e| RunicError::Other(format!("logout failed: {e:?}")))
    }

    fn name(&self) -> &str {
        "internet-identity"
    }
}
