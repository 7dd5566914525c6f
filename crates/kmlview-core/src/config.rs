//! Viewer configuration
//!
//! Defaults reproduce the fixed map view: London, zoom 13, OpenStreetMap tiles.

use crate::summary::LengthMetric;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CENTER: [f64; 2] = [51.505, -0.09];
pub const DEFAULT_ZOOM: u8 = 13;
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Initial map centre as `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    /// CSS height of the map viewport
    pub viewport_height: String,
    /// CSS width of the map viewport
    pub viewport_width: String,
    /// Tile URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub tile_url: String,
    pub tile_attribution: String,
    pub length_metric: LengthMetric,
    /// Fit the initial view to the uploaded features instead of `center`/`zoom`
    pub fit_to_features: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            viewport_height: "500px".to_string(),
            viewport_width: "100%".to_string(),
            tile_url: DEFAULT_TILE_URL.to_string(),
            tile_attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
            length_metric: LengthMetric::TokenCount,
            fit_to_features: false,
        }
    }
}
