use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GeodatahubError, Result};

/// Axis-aligned WGS 84 bounding box
///
/// Serialized as `[west, south, east, north]`, the order used by GeoJSON and
/// STAC. `west > east` is allowed and means the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    /// Build from a slice holding exactly four values
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [west, south, east, north] => Ok(Self::new(*west, *south, *east, *north)),
            _ => Err(GeodatahubError::invalid(
                "bbox",
                format!("expected 4 values (west, south, east, north), got {}", values.len()),
            )),
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// Check coordinate ranges
    pub fn validate(&self) -> Result<()> {
        let values = self.as_array();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeodatahubError::invalid("bbox", "coordinates must be finite"));
        }
        if !(-180.0..=180.0).contains(&self.west) || !(-180.0..=180.0).contains(&self.east) {
            return Err(GeodatahubError::invalid("bbox", "longitudes must be within [-180, 180]"));
        }
        if !(-90.0..=90.0).contains(&self.south) || !(-90.0..=90.0).contains(&self.north) {
            return Err(GeodatahubError::invalid("bbox", "latitudes must be within [-90, 90]"));
        }
        if self.south > self.north {
            return Err(GeodatahubError::invalid("bbox", "south must not exceed north"));
        }
        Ok(())
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Centroid as (lon, lat)
    pub fn center(&self) -> (f64, f64) {
        let lon = if self.crosses_antimeridian() {
            let mid = (self.west + self.east + 360.0) / 2.0;
            if mid > 180.0 {
                mid - 360.0
            } else {
                mid
            }
        } else {
            (self.west + self.east) / 2.0
        };
        (lon, (self.south + self.north) / 2.0)
    }

    /// Whether two boxes share any area (edges count)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        if self.south > other.north || other.south > self.north {
            return false;
        }
        self.lon_ranges()
            .iter()
            .any(|a| other.lon_ranges().iter().any(|b| a.0 <= b.1 && b.0 <= a.1))
    }

    fn lon_ranges(&self) -> Vec<(f64, f64)> {
        if self.crosses_antimeridian() {
            vec![(self.west, 180.0), (-180.0, self.east)]
        } else {
            vec![(self.west, self.east)]
        }
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.as_array()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.west, self.south, self.east, self.north)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_array() {
        let bbox = BoundingBox::new(2.22, 48.81, 2.47, 48.90);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[2.22,48.81,2.47,48.9]");

        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert!(BoundingBox::from_slice(&[1.0, 2.0, 3.0]).is_err());
        assert!(BoundingBox::from_slice(&[1.0, 2.0, 3.0, 4.0]).is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(BoundingBox::new(-10.0, 40.0, 10.0, 50.0).validate().is_ok());
        assert!(BoundingBox::new(-10.0, 50.0, 10.0, 40.0).validate().is_err());
        assert!(BoundingBox::new(-190.0, 40.0, 10.0, 50.0).validate().is_err());
        assert!(BoundingBox::new(f64::NAN, 40.0, 10.0, 50.0).validate().is_err());
        // Antimeridian crossing is accepted
        assert!(BoundingBox::new(170.0, -20.0, -170.0, -10.0).validate().is_ok());
    }

    #[test]
    fn test_intersects() {
        let paris = BoundingBox::new(2.22, 48.81, 2.47, 48.90);
        let france = BoundingBox::new(-5.0, 42.0, 8.0, 51.0);
        let tokyo = BoundingBox::new(139.5, 35.5, 139.9, 35.8);
        assert!(paris.intersects(&france));
        assert!(france.intersects(&paris));
        assert!(!paris.intersects(&tokyo));
    }

    #[test]
    fn test_intersects_across_antimeridian() {
        let fiji = BoundingBox::new(177.0, -19.0, -178.0, -16.0);
        let east = BoundingBox::new(-179.0, -18.0, -178.5, -17.0);
        let west = BoundingBox::new(178.0, -18.0, 179.0, -17.0);
        let far = BoundingBox::new(0.0, -18.0, 1.0, -17.0);
        assert!(fiji.intersects(&east));
        assert!(fiji.intersects(&west));
        assert!(!fiji.intersects(&far));
    }

    #[test]
    fn test_center() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 20.0);
        assert_eq!(bbox.center(), (5.0, 10.0));

        let crossing = BoundingBox::new(170.0, 0.0, -170.0, 10.0);
        let (lon, lat) = crossing.center();
        assert!((lon.abs() - 180.0).abs() < 1e-9);
        assert_eq!(lat, 5.0);
    }
}
