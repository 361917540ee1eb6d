//! Error Types
//!
//! Every failure that reaches a view ends up as exactly one warning notice.
//! [`RunicError::user_message`] is that notice; [`RunicError::kind`] says which
//! part of the stack produced it.

use thiserror::Error;

/// Result type alias for runic operations
pub type Result<T> = std::result::Result<T, RunicError>;

/// Notice shown for transport and unexpected failures.
pub const GENERIC_NOTICE: &str = "An unexpected error occurred. Please try again.";

/// Marker the replica puts in front of the canister-provided reject text.
const REJECT_MESSAGE_MARKER: &str = "with message: '";

/// Broad classification of a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caught client-side, never reached the canister
    Validation,
    /// Login provider failure or anonymous identity
    Auth,
    /// The canister (or replica) rejected the call
    Rejected,
    /// Network, decoding, or anything unexpected
    Transport,
}

/// Internet Computer reject codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectCode {
    SysFatal,
    SysTransient,
    DestinationInvalid,
    CanisterReject,
    CanisterError,
    Unknown(u64),
}

impl From<u64> for RejectCode {
    fn from(code: u64) -> Self {
        match code {
            1 => Self::SysFatal,
            2 => Self::SysTransient,
            3 => Self::DestinationInvalid,
            4 => Self::CanisterReject,
            5 => Self::CanisterError,
            other => Self::Unknown(other),
        }
    }
}

/// A rejection decoded at the RPC boundary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub code: RejectCode,
    /// Human-readable reason, already stripped of replica framing
    pub message: String,
}

impl Rejection {
    /// Decode a rejection from its code and the raw text the replica sent.
    pub fn new(code: impl Into<RejectCode>, raw: &str) -> Self {
        Self {
            code: code.into(),
            message: extract_reject_message(raw),
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Pull the canister's own text out of a replica error string.
///
/// `"... with message: 'Insufficient funds' ..."` yields `Insufficient funds`.
/// Text without the marker is returned unchanged.
pub fn extract_reject_message(raw: &str) -> String {
    raw.find(REJECT_MESSAGE_MARKER)
        .map(|start| &raw[start + REJECT_MESSAGE_MARKER.len()..])
        .and_then(|rest| rest.find('\'').map(|end| &rest[..end]))
        .filter(|message| !message.is_empty())
        .unwrap_or(raw)
        .to_string()
}

/// Runic error types
#[derive(Error, Debug)]
pub enum RunicError {
    /// Missing or non-numeric agent id in the route
    #[error("Invalid route parameter: {0}")]
    InvalidRoute(String),

    /// Form input rejected before submission
    #[error("Validation error: {0}")]
    Validation(String),

    /// Logo file above the upload cap
    #[error("Logo is {size} bytes (max: {max})")]
    LogoTooLarge { size: usize, max: usize },

    /// Login resolved to the anonymous principal
    #[error("Login resolved to the anonymous identity")]
    AnonymousIdentity,

    /// Login provider failed or was closed
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Operation needs a connected wallet
    #[error("No wallet connected")]
    NotAuthenticated,

    /// Canister or replica rejection
    #[error("Call rejected: {0}")]
    Rejected(Rejection),

    /// Network or agent failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Candid encode/decode failure
    #[error("Candid error: {0}")]
    Candid(#[from] candid::Error),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl RunicError {
    /// Classify the error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRoute(_) | Self::Validation(_) | Self::LogoTooLarge { .. } => {
                ErrorKind::Validation
            }
            Self::AnonymousIdentity | Self::LoginFailed(_) | Self::NotAuthenticated => ErrorKind::Auth,
            Self::Rejected(_) => ErrorKind::Rejected,
            Self::Transport(_)
            | Self::Candid(_)
            | Self::Config(_)
            | Self::Json(_)
            | Self::Other(_) => ErrorKind::Transport,
        }
    }

    /// The notice shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRoute(_) => "Invalid or missing id parameter".into(),
            Self::Validation(msg) => msg.clone(),
            Self::LogoTooLarge { .. } => "File size must be under 1.2MB".into(),
            Self::AnonymousIdentity | Self::LoginFailed(_) => {
                "Failed to connect wallet. Please try again.".into()
            }
            Self::NotAuthenticated => "Please connect your wallet first.".into(),
            Self::Rejected(rejection) => rejection.message.clone(),
            _ => GENERIC_NOTICE.into(),
        }
    }
}

impl From<Rejection> for RunicError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<anyhow::Error> for RunicError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_canister_message() {
        let raw = "Call failed:\n  Canister: bkyz2-fmaaa-aaaaa-qaaaq-cai\n  Method: buy (update)\n  \
                   \"Reject code\": \"5\"\n  \"Reject text\": \"Canister called `ic0.trap` with message: 'Insufficient funds'\"";
        assert_eq!(extract_reject_message(raw), "Insufficient funds");
    }

    #[test]
    fn test_message_without_marker_is_unchanged() {
        let raw = "IC0503: Canister bkyz2 trapped explicitly";
        assert_eq!(extract_reject_message(raw), raw);
        assert_eq!(extract_reject_message("with message: ''"), "with message: ''");
    }

    #[test]
    fn test_rejection_notice() {
        let err: RunicError =
            Rejection::new(5_u64, "Canister called `ic0.trap` with message: 'Insufficient funds'").into();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.user_message(), "Insufficient funds");
        assert!(matches!(err, RunicError::Rejected(Rejection { code: RejectCode::CanisterError, .. })));
    }

    #[test]
    fn test_transport_errors_get_generic_notice() {
        let err = RunicError::Transport("connection reset".into());
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.user_message(), GENERIC_NOTICE);
    }

    #[test]
    fn test_reject_code_mapping() {
        assert_eq!(RejectCode::from(4_u64), RejectCode::CanisterReject);
        assert_eq!(RejectCode::from(42_u64), RejectCode::Unknown(42));
    }
}
