//! Leaflet integration for the map panel

use kmlview_core::view::MapModel;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// External JavaScript functions from map-bridge.js
#[wasm_bindgen(module = "/www/js/map-bridge.js")]
extern "C" {
    #[wasm_bindgen(js_name = showMap, catch)]
    fn show_map_internal(
        container_id: &str,
        options_json: &str,
        overlay_json: &str,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = removeMap)]
    fn remove_map_internal(container_id: &str);
}

/// Everything Leaflet needs except the overlay
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions<'a> {
    center: [f64; 2],
    zoom: u8,
    tile_url: &'a str,
    tile_attribution: &'a str,
    fit_bounds: Option<[[f64; 2]; 2]>,
}

fn options_json(map: &MapModel<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&MapOptions {
        center: map.center,
        zoom: map.zoom,
        tile_url: map.tile_layer.url,
        tile_attribution: map.tile_layer.attribution,
        fit_bounds: map.fit_bounds,
    })
}

/// Create (or recreate) the map inside `container_id` with a fresh overlay
pub fn show_map(container_id: &str, map: &MapModel<'_>) -> Result<(), JsValue> {
    let options = options_json(map)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))?;
    let overlay = serde_json::to_string(map.overlay)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))?;

    show_map_internal(container_id, &options, &overlay)
}

/// Tear down the map in `container_id`, if any
pub fn remove_map(container_id: &str) {
    remove_map_internal(container_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use kmlview_core::{ViewModel, ViewerConfig, ViewerState};

    #[test]
    fn test_options_json_shape() {
        let mut state = ViewerState::new();
        state
            .load_text(
                None,
                r#"<kml><Document><Placemark><Point><coordinates>1,2</coordinates></Point></Placemark></Document></kml>"#,
                Default::default(),
            )
            .unwrap();
        let config = ViewerConfig::default();
        let view = ViewModel::from_state(&state, &config);

        let json: serde_json::Value =
            serde_json::from_str(&options_json(view.map.as_ref().unwrap()).unwrap()).unwrap();
        assert_eq!(json["center"], serde_json::json!([51.505, -0.09]));
        assert_eq!(json["zoom"], 13);
        assert_eq!(json["tileUrl"], config.tile_url.as_str());
        assert!(json["fitBounds"].is_null());
    }
}
