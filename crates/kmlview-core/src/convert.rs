//! KML to GeoJSON conversion
//!
//! Delegates reading to the `kml` crate and geometry output to `geojson`.
//! Each placemark is read on its own, so one bad geometry only drops that
//! feature. The result is independent of the summary walkers and may count
//! features differently than they do.

use crate::document::{Element, ParsedDocument};
use crate::error::KmlViewError;
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use kml::types::Placemark;
use kml::Kml;

/// Convert a parsed document into a GeoJSON feature collection
///
/// One feature per placemark that carries a convertible geometry, in
/// document order. `name` and `description` become properties. Placemarks
/// the `kml` reader rejects are skipped.
pub fn convert_to_map(doc: &ParsedDocument) -> FeatureCollection {
    let features = doc
        .placemarks()
        .filter_map(|element| match read_placemark(element) {
            Ok(placemark) => placemark_to_feature(&placemark),
            Err(e) => {
                tracing::debug!(error = %e, "unreadable placemark skipped");
                None
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn read_placemark(element: &Element) -> Result<Placemark, KmlViewError> {
    let kml: Kml = element
        .to_xml()?
        .parse()
        .map_err(|e: kml::Error| KmlViewError::Conversion(e.to_string()))?;

    match kml {
        Kml::Placemark(placemark) => Ok(placemark),
        other => Err(KmlViewError::Conversion(format!(
            "expected a placemark, read {:?}",
            other
        ))),
    }
}

fn placemark_to_feature(placemark: &Placemark) -> Option<Feature> {
    let Some(geometry) = placemark.geometry.clone() else {
        tracing::debug!(name = ?placemark.name, "placemark without geometry skipped");
        return None;
    };

    let geometry = match geo_types::Geometry::<f64>::try_from(geometry) {
        Ok(geometry) => geometry,
        Err(e) => {
            tracing::debug!(name = ?placemark.name, error = %e, "unconvertible geometry skipped");
            return None;
        }
    };

    let mut properties = JsonObject::new();
    if let Some(name) = &placemark.name {
        properties.insert("name".to_string(), JsonValue::from(name.clone()));
    }
    if let Some(description) = &placemark.description {
        properties.insert(
            "description".to_string(),
            JsonValue::from(description.clone()),
        );
    }

    Some(Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}
