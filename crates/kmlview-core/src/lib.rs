//! KML parsing, summaries and GeoJSON conversion for the map viewer
//!
//! The pipeline runs once per uploaded file:
//! - `document::parse`: text to an owned XML element tree
//! - `convert::convert_to_map`: tree to a GeoJSON `FeatureCollection` (via the `kml` crate)
//! - `summary::count_by_type` / `summary::detail_lengths`: the two tables
//!
//! `viewer::ViewerState` holds the results and `view::ViewModel` is what the
//! browser layer renders.

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod summary;
pub mod view;
pub mod viewer;

pub use config::ViewerConfig;
pub use convert::convert_to_map;
pub use document::{parse, Element, ParsedDocument};
pub use error::KmlViewError;
pub use summary::{
    count_by_type, detail_lengths, FeatureLength, FeatureLengthRecord, FeatureType, LengthMetric,
    TypeCounts,
};
pub use view::ViewModel;
pub use viewer::{Upload, ViewerAction, ViewerState};

/// Cheap check that text looks like KML before a full parse
pub fn quick_validate(text: &str) -> Result<(), KmlViewError> {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Err(KmlViewError::Read("File is empty".to_string()));
    }
    if !trimmed.starts_with('<') {
        return Err(KmlViewError::Parse(
            "Not an XML document (expected '<' at start)".to_string(),
        ));
    }
    if !trimmed.contains("<kml") && !trimmed.contains(":kml") {
        return Err(KmlViewError::UnsupportedStructure(
            "No <kml> element found".to_string(),
        ));
    }
    Ok(())
}
