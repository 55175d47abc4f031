use async_trait::async_trait;
use geodatahub_core::error::{GeodatahubError, Result};
use geodatahub_core::models::{BoundingBox, Location, ReverseLocation};
use geodatahub_core::ports::Geocoder;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::footprint::point_geometry;

/// Nominatim usage policy: at most one request per second
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Geocoder backed by a Nominatim (OpenStreetMap) server
pub struct NominatimGeocoder {
    /// Base URL (e.g., "https://nominatim.openstreetmap.org")
    base_url: String,

    client: reqwest::Client,

    min_interval: Duration,

    /// When the previous request was sent
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("GeoDataHub/{}", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GeodatahubError::GeocoderUnavailable {
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            min_interval: MIN_REQUEST_INTERVAL,
            last_request: Mutex::new(None),
        })
    }

    /// Public OpenStreetMap instance
    pub fn openstreetmap() -> Result<Self> {
        Self::new(geodatahub_core::config::DEFAULT_GEOCODER_URL)
    }

    /// Change the spacing enforced between requests
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wait until the minimum interval since the previous request has passed
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = reqwest::Url::parse_with_params(&format!("{}/{}", self.base_url, path), params)
            .map_err(|e| GeodatahubError::ConfigInvalid {
                key: "geocoder_url".to_string(),
                reason: format!("{}: {}", self.base_url, e),
            })?;

        self.throttle().await;
        tracing::debug!(url = %url, "Nominatim request");

        let response = self.client.get(url).send().await.map_err(|e| {
            GeodatahubError::GeocoderUnavailable {
                reason: format!("Failed to reach {}: {}", self.base_url, e),
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeodatahubError::GeocoderUnavailable {
                reason: format!("Nominatim error ({}): {}", status, body),
            });
        }

        response.json().await.map_err(|e| GeodatahubError::GeocoderUnavailable {
            reason: format!("Failed to parse Nominatim response: {}", e),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Location> {
        let params = [
            ("q", place.to_string()),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
            ("polygon_geojson", "1".to_string()),
        ];
        let places: Vec<NominatimPlace> = self.get_json("search", &params).await?;

        let place_info = places.into_iter().next().ok_or_else(|| GeodatahubError::LocationNotFound {
            location: place.to_string(),
        })?;

        let location = place_info.into_location()?;
        tracing::debug!(place, bbox = %location.bbox, "Geocoded");
        Ok(location)
    }

    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<ReverseLocation> {
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("format", "json".to_string()),
        ];
        let reply: NominatimReverse = self.get_json("reverse", &params).await?;

        match reply.display_name {
            Some(display_name) if reply.error.is_none() => Ok(ReverseLocation {
                display_name,
                address: reply.address,
                lat: reply.lat.as_deref().and_then(|v| v.parse().ok()).unwrap_or(lat),
                lon: reply.lon.as_deref().and_then(|v| v.parse().ok()).unwrap_or(lon),
            }),
            _ => Err(GeodatahubError::LocationNotFound {
                location: format!("{}, {}", lat, lon),
            }),
        }
    }
}

/// One `/search` hit; Nominatim encodes numbers as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,

    /// `[south, north, west, east]`
    #[serde(default)]
    boundingbox: Option<Vec<String>>,

    #[serde(default)]
    geojson: Option<Value>,
}

impl NominatimPlace {
    fn into_location(self) -> Result<Location> {
        let lat = parse_coordinate("lat", &self.lat)?;
        let lon = parse_coordinate("lon", &self.lon)?;

        let bbox = match self.boundingbox.as_deref() {
            Some([south, north, west, east]) => BoundingBox::new(
                parse_coordinate("west", west)?,
                parse_coordinate("south", south)?,
                parse_coordinate("east", east)?,
                parse_coordinate("north", north)?,
            ),
            _ => BoundingBox::new(lon, lat, lon, lat),
        };

        let geometry = match self.geojson {
            Some(geometry) if geometry.is_object() => geometry,
            _ => point_geometry(lon, lat),
        };

        Ok(Location {
            bbox,
            geometry,
            display_name: self.display_name,
            lat,
            lon,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Map<String, Value>,
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lon: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn parse_coordinate(name: &str, value: &str) -> Result<f64> {
    value.trim().parse().map_err(|_| GeodatahubError::GeocoderUnavailable {
        reason: format!("Nominatim returned a non-numeric {}: '{}'", name, value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_place_bbox_is_reordered() {
        let place: NominatimPlace = serde_json::from_value(json!({
            "lat": "48.8588897",
            "lon": "2.3200410",
            "display_name": "Paris, Île-de-France, France",
            "boundingbox": ["48.8155755", "48.9021560", "2.2241220", "2.4697602"]
        }))
        .unwrap();

        let location = place.into_location().unwrap();
        assert_eq!(location.bbox, BoundingBox::new(2.2241220, 48.8155755, 2.4697602, 48.9021560));
        assert_eq!(location.geometry["type"], "Point");
        assert_eq!(location.geometry["coordinates"], json!([2.3200410, 48.8588897]));
    }

    #[test]
    fn test_place_keeps_outline() {
        let outline = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]});
        let place: NominatimPlace = serde_json::from_value(json!({
            "lat": "0.5", "lon": "0.5", "display_name": "Somewhere",
            "boundingbox": ["0", "1", "0", "1"],
            "geojson": outline
        }))
        .unwrap();

        assert_eq!(place.into_location().unwrap().geometry, outline);
    }

    #[test]
    fn test_non_numeric_coordinate() {
        let place: NominatimPlace = serde_json::from_value(json!({
            "lat": "north", "lon": "2.0", "display_name": "Bad"
        }))
        .unwrap();
        assert!(matches!(
            place.into_location(),
            Err(GeodatahubError::GeocoderUnavailable { .. })
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let geocoder = NominatimGeocoder::new("http://localhost:8080/").unwrap();
        assert_eq!(geocoder.base_url(), "http://localhost:8080");
    }
}
