//! Host API Client
//!
//! The only call that goes to the serving host: where the canister lives.

use runic_core::ClientConfig;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

fn origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into())
}

/// Fetch the client configuration from the host
pub async fn fetch_config() -> Result<ClientConfig, String> {
    let response = reqwest::Client::new()
        .get(format!("{}/api/config", origin()))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        let config: ClientConfig = response.json().await.map_err(|e| e.to_string())?;
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    } else {
        let data: serde_json::Value = response.json().await.unwrap_or_default();
        Err(data["error"].as_str().unwrap_or("Failed to load configuration").to_string())
    }
}

/// Read a picked file as (mime type, bytes)
pub async fn read_file(file: web_sys::File) -> Result<(String, Vec<u8>), String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("{e:?}"))?;
    let buffer: js_sys::ArrayBuffer = buffer.dyn_into().map_err(|e| format!("{e:?}"))?;
    Ok((file.type_(), js_sys::Uint8Array::new(&buffer).to_vec()))
}
