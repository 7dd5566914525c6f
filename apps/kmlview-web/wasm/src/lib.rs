//! WASM bindings for the KML map viewer
//!
//! Upload a KML file, see its features on a Leaflet map, and get two small
//! tables: feature-type counts and per-line lengths. All state is held in
//! Rust; JavaScript only hosts the page and the Leaflet bridge.
//!
//! ## Architecture
//!
//! - Parsing, conversion and summaries in `kmlview-core`
//! - State management in Rust via `KmlViewerSession`
//! - DOM built from the core `ViewModel` by `render::Page`
//! - Leaflet calls isolated in `www/js/map-bridge.js`
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { mount, KmlViewerSession } from './pkg/kmlview_wasm.js';
//!
//! await init();
//!
//! // Full page inside <div id="app">
//! const viewer = mount("app", { fitToFeatures: false });
//!
//! // Headless
//! const session = new KmlViewerSession();
//! session.loadText("route.kml", text);
//! const counts = session.getTypeCounts();   // { Point: 0, LineString: 1, ... }
//! const details = session.getFeatureDetails();
//! ```

pub mod intake;
pub mod map_bridge;
pub mod render;
pub mod session;

use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use session::KmlViewerSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"KML viewer WASM initialized".into());
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Build the viewer page inside the element with id `root_id`
///
/// `config` is an optional partial `ViewerConfig` object.
#[wasm_bindgen]
pub fn mount(root_id: &str, config: JsValue) -> Result<KmlViewerSession, JsValue> {
    let mut session = KmlViewerSession::with_config(config)?;
    session.attach(root_id)?;
    Ok(session)
}

/// Quick sanity check that text looks like KML
/// Returns Ok(()) if plausible, Err with message if not
#[wasm_bindgen]
pub fn quick_validate(text: &str) -> Result<(), JsValue> {
    kmlview_core::quick_validate(text).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
