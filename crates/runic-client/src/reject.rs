//! Agent Error Mapping
//!
//! Rejections are decoded here, once, so views only ever see
//! [`RunicError::Rejected`] with the canister's own text.

use ic_agent::AgentError;
use runic_core::error::extract_reject_message;
use runic_core::{RejectCode, Rejection, RunicError};

/// Convert an `ic-agent` failure into a [`RunicError`]
pub fn map_agent_error(err: AgentError) -> RunicError {
    match err {
        AgentError::CertifiedReject(reject) | AgentError::UncertifiedReject(reject) => {
            Rejection::new(reject.reject_code as u64, &reject.reject_message).into()
        }
        other => {
            let text = other.to_string();
            if extract_reject_message(&text) == text {
                RunicError::Transport(text)
            } else {
                Rejection::new(RejectCode::Unknown(0), &text).into()
            }
        }
    }
}
