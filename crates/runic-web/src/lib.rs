//! runic-agent Web Frontend
//!
//! Leptos-based WASM frontend. Pages render the view controllers from
//! `runic-core`; canister calls go straight from the browser to the IC.

mod api;
mod app;
mod components;
mod identity;
mod pages;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
