//! HTTP Handlers

use axum::{Json, extract::State, http::StatusCode};
use runic_core::ClientConfig;
use serde::Serialize;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub canister_reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let canister_reachable = match &state.connector {
        Some(connector) => match connector.canister(None).await {
            Ok(canister) => canister
                .list_agents()
                .await
                .inspect_err(|e| tracing::warn!("canister health probe failed: {e}"))
                .is_ok(),
            Err(e) => {
                tracing::warn!("could not build agent for health probe: {e}");
                false
            }
        },
        None => false,
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        canister_reachable,
    })
}

/// Runtime configuration for the browser client
pub async fn client_config(
    State(state): State<AppState>,
) -> Result<Json<ClientConfig>, (StatusCode, Json<ErrorResponse>)> {
    state.client_config().cloned().map(Json).ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Backend canister not configured".into(),
                code: "CANISTER_NOT_CONFIGURED".into(),
            }),
        )
    })
}
