use async_trait::async_trait;
use geodatahub_core::error::{GeodatahubError, Result};
use geodatahub_core::models::{BoundingBox, Location, ReverseLocation};
use geodatahub_core::ports::Geocoder;
use serde_json::Map;
use std::collections::HashMap;

use crate::footprint::bbox_to_geometry;

/// Geocoder answering from an in-memory table of places
///
/// Lookups ignore case and surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, Location>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a place covering `bbox`, centred on the box
    pub fn with_place(mut self, name: &str, bbox: BoundingBox) -> Self {
        let (lon, lat) = bbox.center();
        self.insert(Location {
            bbox,
            geometry: bbox_to_geometry(&bbox),
            display_name: name.to_string(),
            lat,
            lon,
        });
        self
    }

    pub fn insert(&mut self, location: Location) {
        self.places.insert(normalize(&location.display_name), location);
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, place: &str) -> Result<Location> {
        self.places
            .get(&normalize(place))
            .cloned()
            .ok_or_else(|| GeodatahubError::LocationNotFound {
                location: place.to_string(),
            })
    }

    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<ReverseLocation> {
        let point = BoundingBox::new(lon, lat, lon, lat);

        // Smallest box containing the point is the most specific place
        self.places
            .values()
            .filter(|location| location.bbox.intersects(&point))
            .min_by(|a, b| area(&a.bbox).total_cmp(&area(&b.bbox)))
            .map(|location| ReverseLocation {
                display_name: location.display_name.clone(),
                address: Map::new(),
                lat,
                lon,
            })
            .ok_or_else(|| GeodatahubError::LocationNotFound {
                location: format!("{}, {}", lat, lon),
            })
    }
}

fn area(bbox: &BoundingBox) -> f64 {
    let width = if bbox.crosses_antimeridian() {
        bbox.east + 360.0 - bbox.west
    } else {
        bbox.east - bbox.west
    };
    width * (bbox.north - bbox.south)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geocoder() -> StaticGeocoder {
        StaticGeocoder::new()
            .with_place("France", BoundingBox::new(-5.0, 42.0, 8.0, 51.0))
            .with_place("Paris", BoundingBox::new(2.22, 48.81, 2.47, 48.90))
    }

    #[tokio::test]
    async fn test_geocode_is_case_insensitive() {
        let location = geocoder().geocode("  paris ").await.unwrap();
        assert_eq!(location.display_name, "Paris");
        assert_eq!(location.bbox, BoundingBox::new(2.22, 48.81, 2.47, 48.90));
        assert_eq!(location.geometry["type"], "Polygon");
    }

    #[tokio::test]
    async fn test_geocode_unknown_place() {
        let err = geocoder().geocode("Atlantis").await.unwrap_err();
        assert!(matches!(err, GeodatahubError::LocationNotFound { ref location } if location == "Atlantis"));
    }

    #[tokio::test]
    async fn test_reverse_prefers_smallest_place() {
        let geocoder = geocoder();
        assert_eq!(geocoder.reverse_geocode(48.85, 2.35).await.unwrap().display_name, "Paris");
        assert_eq!(geocoder.reverse_geocode(45.0, 5.0).await.unwrap().display_name, "France");
        assert!(geocoder.reverse_geocode(35.6, 139.7).await.is_err());
    }
}
