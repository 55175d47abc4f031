use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Location, ReverseLocation};

/// Port for resolving place names to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name to its bounding box and geometry
    ///
    /// Fails with `LocationNotFound` when the service has no match and
    /// `GeocoderUnavailable` when it cannot be reached.
    async fn geocode(&self, place: &str) -> Result<Location>;

    /// Describe the place at a coordinate
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<ReverseLocation>;
}
