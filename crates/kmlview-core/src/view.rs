//! Render model
//!
//! A pure function of viewer state and config. The browser layer turns it
//! into DOM nodes and map calls; nothing here touches the DOM.

use crate::config::ViewerConfig;
use crate::viewer::{ViewerAction, ViewerState};
use geo::BoundingRect;
use geojson::{FeatureCollection, Value};
use geo_types::{Coord, MultiPoint, Point};
use serde::Serialize;

pub const HEADING: &str = "KML File Map Viewer";
pub const FILE_ACCEPT: &str = ".kml";
pub const SUMMARY_HEADERS: [&str; 2] = ["Element Type", "Count"];
pub const DETAILS_HEADERS: [&str; 2] = ["Element Type", "Total Length"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonModel {
    pub label: &'static str,
    /// Bootstrap button variant
    pub variant: &'static str,
    pub action: ViewerAction,
}

pub static BUTTONS: [ButtonModel; 2] = [
    ButtonModel {
        label: "Summary",
        variant: "primary",
        action: ViewerAction::ClearSummary,
    },
    ButtonModel {
        label: "Detailed",
        variant: "secondary",
        action: ViewerAction::ClearDetails,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableModel {
    pub headers: [&'static str; 2],
    pub rows: Vec<[String; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayerModel<'a> {
    pub url: &'a str,
    pub attribution: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapModel<'a> {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub height: &'a str,
    pub width: &'a str,
    pub tile_layer: TileLayerModel<'a>,
    pub overlay: &'a FeatureCollection,
    /// `[[south, west], [north, east]]`, only when fitting to features
    pub fit_bounds: Option<[[f64; 2]; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel<'a> {
    pub heading: &'static str,
    pub file_accept: &'static str,
    pub buttons: &'static [ButtonModel; 2],
    pub summary: Option<TableModel>,
    pub details: Option<TableModel>,
    pub map: Option<MapModel<'a>>,
}

impl<'a> ViewModel<'a> {
    pub fn from_state(state: &'a ViewerState, config: &'a ViewerConfig) -> Self {
        Self {
            heading: HEADING,
            file_accept: FILE_ACCEPT,
            buttons: &BUTTONS,
            summary: summary_table(state),
            details: details_table(state),
            map: state.map_data().map(|overlay| MapModel {
                center: config.center,
                zoom: config.zoom,
                height: &config.viewport_height,
                width: &config.viewport_width,
                tile_layer: TileLayerModel {
                    url: &config.tile_url,
                    attribution: &config.tile_attribution,
                },
                overlay,
                fit_bounds: if config.fit_to_features {
                    feature_bounds(overlay)
                } else {
                    None
                },
            }),
        }
    }
}

fn summary_table(state: &ViewerState) -> Option<TableModel> {
    let counts = state.type_counts()?;
    Some(TableModel {
        headers: SUMMARY_HEADERS,
        rows: counts
            .iter()
            .map(|(feature_type, count)| [feature_type.to_string(), count.to_string()])
            .collect(),
    })
}

fn details_table(state: &ViewerState) -> Option<TableModel> {
    let details = state.details();
    if details.is_empty() {
        return None;
    }
    Some(TableModel {
        headers: DETAILS_HEADERS,
        rows: details
            .iter()
            .map(|d| [d.feature_type.to_string(), d.length.to_string()])
            .collect(),
    })
}

/// Bounding box of every position in the collection, in Leaflet order
pub fn feature_bounds(collection: &FeatureCollection) -> Option<[[f64; 2]; 2]> {
    let mut points = Vec::new();
    for feature in &collection.features {
        if let Some(geometry) = &feature.geometry {
            collect_positions(&geometry.value, &mut points);
        }
    }

    let rect = MultiPoint::new(points).bounding_rect()?;
    let (min, max) = (rect.min(), rect.max());
    Some([[min.y, min.x], [max.y, max.x]])
}

fn collect_positions(value: &Value, points: &mut Vec<Point<f64>>) {
    let mut push = |position: &Vec<f64>| {
        if let [x, y, ..] = position.as_slice() {
            points.push(Point::from(Coord { x: *x, y: *y }));
        }
    };

    match value {
        Value::Point(p) => push(p),
        Value::MultiPoint(ps) | Value::LineString(ps) => ps.iter().for_each(push),
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().for_each(push)
        }
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(push),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_positions(&geometry.value, points);
            }
        }
    }
}
