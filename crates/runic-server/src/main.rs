//! runic-agent HTTP Server
//!
//! Serves the compiled WASM front end and tells it where the backend
//! canister lives. All application logic runs in the browser against the
//! canister; this host never proxies canister calls.

mod handlers;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, routing::get};
use runic_client::IcConnector;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{client_config, health_check};
use crate::state::AppState;

/// Build the router; unknown paths fall back to `index.html` so client-side
/// routes (`/agent?id=..`, `/vault`) load the app
fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let index = state.static_dir.join("index.html");
    let assets = ServeDir::new(&state.static_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/config", get(client_config))
        .fallback_service(assets)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let connector = match IcConnector::from_env() {
        Ok(connector) => {
            let config = connector.config();
            tracing::info!("✓ Backend canister {}", config.backend_canister_id);
            tracing::info!("  IC host: {}", config.ic_host);
            tracing::info!("  Identity provider: {}", config.identity_provider);
            Some(Arc::new(connector))
        }
        Err(e) => {
            tracing::warn!("⚠ Canister not configured - /api/config will return 503");
            tracing::warn!("  {}", e);
            tracing::warn!("  Set BACKEND_CANISTER_ID (and IC_HOST for mainnet) in .env");
            None
        }
    };

    let static_dir = PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()));
    let app = router(AppState {
        connector,
        static_dir,
    });

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 runic-agent server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health     - Health check + canister probe");
    tracing::info!("  GET  /api/config - Client configuration");
    tracing::info!("  GET  /*          - WASM front end");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use runic_core::ClientConfig;
    use tower::ServiceExt;

    use super::*;

    fn state(configured: bool) -> AppState {
        let connector = configured.then(|| {
            Arc::new(
                IcConnector::from_config(ClientConfig::local("bkyz2-fmaaa-aaaaa-qaaaq-cai"))
                    .unwrap(),
            )
        });
        AppState {
            connector,
            static_dir: PathBuf::from("does-not-exist"),
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let (status, body) = get_json(router(state(true)), "/api/config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend_canister_id"], "bkyz2-fmaaa-aaaaa-qaaaq-cai");
        assert_eq!(body["fetch_root_key"], true);
    }

    #[tokio::test]
    async fn test_config_missing() {
        let (status, body) = get_json(router(state(false)), "/api/config").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "CANISTER_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_health_without_canister() {
        let (status, body) = get_json(router(state(false)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["canister_reachable"], false);
    }
}
