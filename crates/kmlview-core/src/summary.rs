//! Feature-type counts and per-feature length records
//!
//! Both walks read the raw element tree, independently of the GeoJSON
//! conversion. A placemark's type is the name of its first element child.

use crate::document::{Element, ParsedDocument};
use geo::HaversineLength;
use geo_types::{Coord, LineString};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Tag searched for inside line features
const COORDINATES_TAG: &str = "coordinates";

/// The closed set of feature types that are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeatureType {
    Point,
    LineString,
    Polygon,
    MultiLineString,
}

impl FeatureType {
    /// All known types, in table order
    pub const ALL: [FeatureType; 4] = [
        FeatureType::Point,
        FeatureType::LineString,
        FeatureType::Polygon,
        FeatureType::MultiLineString,
    ];

    /// Match a tag name exactly; anything else is not a known type
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(FeatureType::Point),
            "LineString" => Some(FeatureType::LineString),
            "Polygon" => Some(FeatureType::Polygon),
            "MultiLineString" => Some(FeatureType::MultiLineString),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Point => "Point",
            FeatureType::LineString => "LineString",
            FeatureType::Polygon => "Polygon",
            FeatureType::MultiLineString => "MultiLineString",
        }
    }

    /// LineString and MultiLineString get length records
    pub fn is_line(&self) -> bool {
        matches!(self, FeatureType::LineString | FeatureType::MultiLineString)
    }

    fn index(&self) -> usize {
        match self {
            FeatureType::Point => 0,
            FeatureType::LineString => 1,
            FeatureType::Polygon => 2,
            FeatureType::MultiLineString => 3,
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occurrence count per known feature type; always holds all four keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeCounts {
    counts: [usize; 4],
}

impl TypeCounts {
    pub fn get(&self, feature_type: FeatureType) -> usize {
        self.counts[feature_type.index()]
    }

    fn increment(&mut self, feature_type: FeatureType) {
        self.counts[feature_type.index()] += 1;
    }

    /// Sum over all four types
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// (type, count) pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (FeatureType, usize)> + '_ {
        FeatureType::ALL.iter().map(move |t| (*t, self.get(*t)))
    }
}

impl Serialize for TypeCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FeatureType::ALL.len()))?;
        for (feature_type, count) in self.iter() {
            map.serialize_entry(feature_type.as_str(), &count)?;
        }
        map.end()
    }
}

/// How the "length" of a line feature is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LengthMetric {
    /// Number of space-separated coordinate tokens
    #[default]
    TokenCount,
    /// Great-circle length in metres
    Haversine,
}

/// Length value of one line feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "camelCase")]
pub enum FeatureLength {
    Tokens(usize),
    Meters(f64),
}

impl fmt::Display for FeatureLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureLength::Tokens(n) => write!(f, "{}", n),
            FeatureLength::Meters(m) if *m >= 1000.0 => write!(f, "{:.2} km", m / 1000.0),
            FeatureLength::Meters(m) => write!(f, "{:.1} m", m),
        }
    }
}

/// One row of the details table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureLengthRecord {
    pub feature_type: FeatureType,
    pub length: FeatureLength,
}

/// Name of a placemark's first element child, if any
pub fn placemark_type_name(placemark: &Element) -> Option<&str> {
    placemark.first_child_element().map(|el| el.name.as_str())
}

fn placemark_type(placemark: &Element) -> Option<FeatureType> {
    placemark_type_name(placemark).and_then(FeatureType::from_tag_name)
}

/// Count placemarks per known type
///
/// Placemarks whose first child is not a known type, or that have no element
/// children at all, are not counted.
pub fn count_by_type(doc: &ParsedDocument) -> TypeCounts {
    let mut counts = TypeCounts::default();

    for placemark in doc.placemarks() {
        match placemark_type(placemark) {
            Some(feature_type) => counts.increment(feature_type),
            None => tracing::debug!(
                first_child = ?placemark_type_name(placemark),
                "placemark type not counted"
            ),
        }
    }

    counts
}

/// One length record per LineString/MultiLineString placemark, in document order
///
/// Only the first `coordinates` element inside the placemark is read. Line
/// placemarks without one are skipped.
pub fn detail_lengths(doc: &ParsedDocument, metric: LengthMetric) -> Vec<FeatureLengthRecord> {
    let mut details = Vec::new();

    for placemark in doc.placemarks() {
        let Some(feature_type) = placemark_type(placemark).filter(FeatureType::is_line) else {
            continue;
        };

        let Some(coordinates) = placemark.find_descendant(COORDINATES_TAG) else {
            tracing::debug!(%feature_type, "line placemark without coordinates skipped");
            continue;
        };

        let text = coordinates.text_content();
        let tokens = split_coordinate_tokens(&text);
        let length = match metric {
            LengthMetric::TokenCount => FeatureLength::Tokens(tokens.len()),
            LengthMetric::Haversine => FeatureLength::Meters(haversine_length(&tokens)),
        };

        details.push(FeatureLengthRecord {
            feature_type,
            length,
        });
    }

    details
}

/// Trim, then split on single spaces; repeated spaces yield empty tokens
pub fn split_coordinate_tokens(text: &str) -> Vec<&str> {
    text.trim().split(' ').collect()
}

/// Parse a `lon,lat[,alt]` token
fn parse_coord(token: &str) -> Option<Coord<f64>> {
    let mut parts = token.split(',');
    let x = parts.next()?.trim().parse().ok()?;
    let y = parts.next()?.trim().parse().ok()?;
    Some(Coord { x, y })
}

/// Great-circle length over the parseable tokens, in metres
pub fn haversine_length(tokens: &[&str]) -> f64 {
    let line: LineString<f64> = tokens.iter().filter_map(|t| parse_coord(t)).collect();
    line.haversine_length()
}
