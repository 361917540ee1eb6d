//! Create-Agent Form
//!
//! Validates the form locally, encodes the logo as a data URI, and submits
//! `create_agent`. The Home page refreshes its catalog after a success.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Result, RunicError};
use crate::model::{AgentId, CreateAgentArgs};
use crate::service::CanisterConnector;
use crate::store::AppStore;
use crate::task::{ScopeHandle, ViewScope};

/// Upload cap for agent logos (1.2 MiB)
pub const MAX_LOGO_BYTES: usize = 1_258_291;

/// Logo image accepted for upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoUpload {
    mime: String,
    data_uri: String,
    size: usize,
}

impl LogoUpload {
    /// Check type and size, then encode as `data:<mime>;base64,...`
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Result<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(RunicError::Validation(format!(
                "Logo must be an image, got '{mime}'"
            )));
        }
        if bytes.len() > MAX_LOGO_BYTES {
            return Err(RunicError::LogoTooLarge {
                size: bytes.len(),
                max: MAX_LOGO_BYTES,
            });
        }

        let data_uri = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        Ok(Self {
            mime,
            data_uri,
            size: bytes.len(),
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub const fn size(&self) -> usize {
        self.size
    }
}

/// Raw create-agent form input
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentDraft {
    pub name: String,
    pub ticker: String,
    pub description: String,
    pub website: String,
    pub twitter: String,
    pub discord: String,
    pub openchat: String,
    pub logo: Option<LogoUpload>,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Ticker as stored by the canister: a number, or a single symbol taken as
/// its code point
fn parse_ticker(raw: &str) -> Result<Option<u32>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(number) = raw.parse::<u32>() {
        return Ok(Some(number));
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(Some(u32::from(symbol))),
        _ => Err(RunicError::Validation(format!(
            "Ticker must be a number or a single symbol, got '{raw}'"
        ))),
    }
}

impl AgentDraft {
    /// Validate and build the call arguments
    pub fn to_args(&self) -> Result<CreateAgentArgs> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RunicError::Validation("Agent name is required".into()));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(RunicError::Validation("Description is required".into()));
        }

        Ok(CreateAgentArgs {
            name: name.to_string(),
            ticker: parse_ticker(&self.ticker)?,
            logo: self.logo.as_ref().map(|logo| logo.data_uri().to_string()),
            description: description.to_string(),
            website: optional(&self.website),
            twitter: optional(&self.twitter),
            openchat: optional(&self.openchat),
            discord: optional(&self.discord),
        })
    }
}

/// Controller of the create-agent modal
pub struct AgentCreator {
    connector: Arc<dyn CanisterConnector>,
    store: AppStore,
    scope: ViewScope,
    busy: AtomicBool,
}

impl AgentCreator {
    pub fn new(connector: Arc<dyn CanisterConnector>, store: AppStore) -> Self {
        Self {
            connector,
            store,
            scope: ViewScope::new(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn scope(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Submit the draft.
    ///
    /// Returns the new agent id. Validation and remote failures become the
    /// store warning and return `None`.
    pub async fn submit(&self, draft: &AgentDraft) -> Option<AgentId> {
        let args = match draft.to_args() {
            Ok(args) => args,
            Err(e) => {
                self.store.report(&e);
                return None;
            }
        };
        let Some(wallet) = self.store.wallet() else {
            self.store.report(&RunicError::NotAuthenticated);
            return None;
        };
        if self.busy.swap(true, Ordering::AcqRel) {
            return None;
        }

        let name = args.name.clone();
        let created = self
            .scope
            .handle()
            .guard(async {
                self.connector
                    .connect(Some(&wallet))
                    .await?
                    .create_agent(args)
                    .await
            })
            .await;
        self.busy.store(false, Ordering::Release);

        match created? {
            Ok(id) => {
                tracing::info!(agent = id, %name, "agent created");
                self.scope.handle().apply(|| id)
            }
            Err(e) => {
                self.store.report(&e);
                None
            }
        }
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
