use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub bbox: BoundingBox,

    /// GeoJSON geometry of the place (outline or centroid point)
    pub geometry: serde_json::Value,

    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Result of a reverse lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseLocation {
    pub display_name: String,

    /// Address components as returned by the geocoder (city, country, ...)
    #[serde(default)]
    pub address: serde_json::Map<String, serde_json::Value>,

    pub lat: f64,
    pub lon: f64,
}
