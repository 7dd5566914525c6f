//! Viewer state
//!
//! Holds the four per-upload values. An upload is fully computed before any
//! of them is replaced, so a failed upload leaves the previous state intact.

use crate::convert::convert_to_map;
use crate::document::{parse, ParsedDocument};
use crate::error::KmlViewError;
use crate::summary::{count_by_type, detail_lengths, FeatureLengthRecord, LengthMetric, TypeCounts};
use geojson::FeatureCollection;
use serde::Serialize;

/// User actions bound to the two table buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewerAction {
    /// "Summary" button: empties the type counts
    ClearSummary,
    /// "Detailed" button: empties the length records
    ClearDetails,
}

/// Everything derived from one uploaded file
#[derive(Debug, Clone)]
pub struct Upload {
    pub document: ParsedDocument,
    pub map_data: FeatureCollection,
    pub type_counts: TypeCounts,
    pub details: Vec<FeatureLengthRecord>,
}

impl Upload {
    /// Parse, convert and summarise KML text
    pub fn from_text(text: &str, metric: LengthMetric) -> Result<Self, KmlViewError> {
        let document = parse(text)?;
        let map_data = convert_to_map(&document);
        let type_counts = count_by_type(&document);
        let details = detail_lengths(&document, metric);

        tracing::info!(
            placemarks = document.placemarks().count(),
            features = map_data.features.len(),
            counted = type_counts.total(),
            lines = details.len(),
            "KML upload processed"
        );

        Ok(Self {
            document,
            map_data,
            type_counts,
            details,
        })
    }
}

#[derive(Debug, Default)]
pub struct ViewerState {
    file_name: Option<String>,
    document: Option<ParsedDocument>,
    map_data: Option<FeatureCollection>,
    type_counts: Option<TypeCounts>,
    details: Vec<FeatureLengthRecord>,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process `text` and replace all state with the result
    ///
    /// On error nothing is replaced.
    pub fn load_text(
        &mut self,
        file_name: Option<&str>,
        text: &str,
        metric: LengthMetric,
    ) -> Result<(), KmlViewError> {
        let upload = Upload::from_text(text, metric).inspect_err(|e| {
            tracing::warn!(file = ?file_name, error = %e, "KML upload rejected");
        })?;
        self.apply_upload(file_name, upload);
        Ok(())
    }

    /// Replace all four values at once
    pub fn apply_upload(&mut self, file_name: Option<&str>, upload: Upload) {
        self.file_name = file_name.map(str::to_string);
        self.document = Some(upload.document);
        self.map_data = Some(upload.map_data);
        self.type_counts = Some(upload.type_counts);
        self.details = upload.details;
    }

    pub fn dispatch(&mut self, action: ViewerAction) {
        match action {
            ViewerAction::ClearSummary => self.type_counts = None,
            ViewerAction::ClearDetails => self.details.clear(),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn document(&self) -> Option<&ParsedDocument> {
        self.document.as_ref()
    }

    pub fn map_data(&self) -> Option<&FeatureCollection> {
        self.map_data.as_ref()
    }

    /// `None` is the empty mapping: nothing uploaded yet, or cleared
    pub fn type_counts(&self) -> Option<&TypeCounts> {
        self.type_counts.as_ref()
    }

    pub fn details(&self) -> &[FeatureLengthRecord] {
        &self.details
    }

    pub fn has_map(&self) -> bool {
        self.map_data.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{FeatureLength, FeatureType};
    use pretty_assertions::assert_eq;

    const POINT: &str = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
<Placemark><Point><coordinates>-0.09,51.505,0</coordinates></Point></Placemark>
</Document></kml>"#;

    const LINES: &str = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
<Placemark><LineString><coordinates>1,1,0 2,2,0 3,3,0</coordinates></LineString></Placemark>
<Placemark><Polygon><outerBoundaryIs><LinearRing><coordinates>0,0 1,0 1,1 0,0</coordinates></LinearRing></outerBoundaryIs></Polygon></Placemark>
</Document></kml>"#;

    #[test]
    fn test_new_state_is_empty() {
        let state = ViewerState::new();
        assert!(state.type_counts().is_none());
        assert!(state.details().is_empty());
        assert!(!state.has_map());
        assert!(state.document().is_none());
    }

    #[test]
    fn test_single_point_upload() {
        let mut state = ViewerState::new();
        state
            .load_text(Some("point.kml"), POINT, LengthMetric::TokenCount)
            .unwrap();

        let counts = state.type_counts().unwrap();
        assert_eq!(counts.get(FeatureType::Point), 1);
        assert_eq!(counts.get(FeatureType::LineString), 0);
        assert_eq!(counts.get(FeatureType::Polygon), 0);
        assert_eq!(counts.get(FeatureType::MultiLineString), 0);
        assert!(state.details().is_empty());
        assert!(state.has_map());
        assert_eq!(state.file_name(), Some("point.kml"));
    }

    #[test]
    fn test_reupload_replaces_everything() {
        let mut state = ViewerState::new();
        state
            .load_text(Some("lines.kml"), LINES, LengthMetric::TokenCount)
            .unwrap();
        assert_eq!(state.details().len(), 1);
        assert_eq!(state.details()[0].length, FeatureLength::Tokens(3));

        state
            .load_text(Some("point.kml"), POINT, LengthMetric::TokenCount)
            .unwrap();
        let counts = state.type_counts().unwrap();
        assert_eq!(counts.get(FeatureType::Point), 1);
        assert_eq!(counts.get(FeatureType::LineString), 0);
        assert_eq!(counts.get(FeatureType::Polygon), 0);
        assert!(state.details().is_empty());
        assert_eq!(state.map_data().unwrap().features.len(), 1);
        assert_eq!(state.file_name(), Some("point.kml"));
    }

    #[test]
    fn test_failed_upload_keeps_previous_state() {
        let mut state = ViewerState::new();
        state
            .load_text(Some("lines.kml"), LINES, LengthMetric::TokenCount)
            .unwrap();

        let result = state.load_text(Some("bad.kml"), "<kml><Document>", LengthMetric::TokenCount);
        assert!(matches!(result, Err(KmlViewError::Parse(_))));
        assert_eq!(state.file_name(), Some("lines.kml"));
        assert_eq!(state.details().len(), 1);
        assert_eq!(state.type_counts().unwrap().get(FeatureType::Polygon), 1);
    }

    const DAMAGED: &str = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
<Placemark><LineString/></Placemark>
<Placemark><LineString><coordinates>abc def</coordinates></LineString></Placemark>
<Placemark><Point><coordinates/></Point></Placemark>
<Placemark><name>Good</name><Point><coordinates>1,2</coordinates></Point></Placemark>
</Document></kml>"#;

    #[test]
    fn test_damaged_geometries_do_not_fail_upload() {
        let mut state = ViewerState::new();
        state
            .load_text(Some("damaged.kml"), DAMAGED, LengthMetric::TokenCount)
            .unwrap();

        let counts = state.type_counts().unwrap();
        assert_eq!(counts.get(FeatureType::LineString), 2);
        assert_eq!(counts.get(FeatureType::Point), 2);
        assert_eq!(counts.total(), 4);

        // `<LineString/>` has no coordinates and gets no record
        assert_eq!(state.details().len(), 1);
        assert_eq!(state.details()[0].length, FeatureLength::Tokens(2));

        let map = state.map_data().unwrap();
        let good_points: Vec<_> = map
            .features
            .iter()
            .filter_map(|f| match &f.geometry.as_ref()?.value {
                geojson::Value::Point(position) => Some(position.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(good_points, vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn test_damaged_upload_replaces_previous_tables() {
        let mut state = ViewerState::new();
        state
            .load_text(Some("lines.kml"), LINES, LengthMetric::TokenCount)
            .unwrap();
        state
            .load_text(Some("damaged.kml"), DAMAGED, LengthMetric::TokenCount)
            .unwrap();

        assert_eq!(state.file_name(), Some("damaged.kml"));
        assert_eq!(state.type_counts().unwrap().get(FeatureType::Polygon), 0);
        assert_eq!(state.details()[0].length, FeatureLength::Tokens(2));
    }

    // Literal button behaviour: both buttons empty their table instead of
    // showing it. Probably inverted, kept as-is.
    #[test]
    fn test_clear_summary_empties_counts_only() {
        let mut state = ViewerState::new();
        state.load_text(None, LINES, LengthMetric::TokenCount).unwrap();

        state.dispatch(ViewerAction::ClearSummary);
        assert!(state.type_counts().is_none());
        assert_eq!(state.details().len(), 1);
        assert!(state.has_map());
    }

    #[test]
    fn test_clear_details_empties_records_only() {
        let mut state = ViewerState::new();
        state.load_text(None, LINES, LengthMetric::TokenCount).unwrap();

        state.dispatch(ViewerAction::ClearDetails);
        assert!(state.details().is_empty());
        assert!(state.type_counts().is_some());
    }

    #[test]
    fn test_upload_after_clear_restores_tables() {
        let mut state = ViewerState::new();
        state.load_text(None, LINES, LengthMetric::TokenCount).unwrap();
        state.dispatch(ViewerAction::ClearSummary);
        state.dispatch(ViewerAction::ClearDetails);

        state.load_text(None, LINES, LengthMetric::TokenCount).unwrap();
        assert!(state.type_counts().is_some());
        assert_eq!(state.details().len(), 1);
    }
}
