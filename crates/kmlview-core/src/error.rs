use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KmlViewError {
    #[error("Failed to read file: {0}")]
    Read(String),

    #[error("Failed to parse KML: {0}")]
    Parse(String),

    #[error("Unsupported document structure: {0}")]
    UnsupportedStructure(String),

    #[error("GeoJSON conversion failed: {0}")]
    Conversion(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<quick_xml::Error> for KmlViewError {
    fn from(e: quick_xml::Error) -> Self {
        KmlViewError::Parse(e.to_string())
    }
}
