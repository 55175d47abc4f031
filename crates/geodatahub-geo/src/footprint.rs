use geo::{BoundingRect, LineString, Point, Polygon};
use geodatahub_core::models::BoundingBox;
use serde_json::Value;

/// Bounds of a GeoJSON geometry, `None` when it cannot be read
pub fn footprint_bounds(geometry: &Value) -> Option<BoundingBox> {
    let geometry = geojson::Geometry::from_json_value(geometry.clone()).ok()?;
    let geometry = geo::Geometry::<f64>::try_from(geometry).ok()?;
    let rect = geometry.bounding_rect()?;

    Some(BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
}

/// GeoJSON polygon tracing a bounding box
///
/// The ring is built from the corners in order, so a box crossing the
/// antimeridian keeps `west > east`.
pub fn bbox_to_geometry(bbox: &BoundingBox) -> Value {
    let ring = LineString::from(vec![
        (bbox.west, bbox.south),
        (bbox.east, bbox.south),
        (bbox.east, bbox.north),
        (bbox.west, bbox.north),
        (bbox.west, bbox.south),
    ]);
    let polygon = Polygon::new(ring, vec![]);
    to_json(geojson::Geometry::new(geojson::Value::from(&polygon)))
}

/// GeoJSON point at (lon, lat)
pub fn point_geometry(lon: f64, lat: f64) -> Value {
    to_json(geojson::Geometry::new(geojson::Value::from(&Point::new(lon, lat))))
}

fn to_json(geometry: geojson::Geometry) -> Value {
    serde_json::to_value(&geometry).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_polygon_bounds() {
        let footprint = json!({
            "type": "Polygon",
            "coordinates": [[[2.0, 48.5], [3.1, 48.4], [3.0, 49.2], [1.9, 49.0], [2.0, 48.5]]]
        });
        let bbox = footprint_bounds(&footprint).unwrap();
        assert_eq!(bbox, BoundingBox::new(1.9, 48.4, 3.1, 49.2));
    }

    #[test]
    fn test_multipolygon_bounds() {
        let footprint = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                [[[5.0, 5.0], [6.0, 5.0], [6.0, 7.0], [5.0, 5.0]]]
            ]
        });
        assert_eq!(footprint_bounds(&footprint), Some(BoundingBox::new(0.0, 0.0, 6.0, 7.0)));
    }

    #[test]
    fn test_invalid_footprint() {
        assert!(footprint_bounds(&json!({"type": "Polygon"})).is_none());
        assert!(footprint_bounds(&json!("not a geometry")).is_none());
        assert!(footprint_bounds(&Value::Null).is_none());
    }

    #[test]
    fn test_point_geometry() {
        let point = point_geometry(2.35, 48.85);
        assert_eq!(point["type"], "Point");
        assert_eq!(point["coordinates"], json!([2.35, 48.85]));
        assert_eq!(footprint_bounds(&point), Some(BoundingBox::new(2.35, 48.85, 2.35, 48.85)));
    }

    #[test]
    fn test_antimeridian_ring_keeps_corner_order() {
        let polygon = bbox_to_geometry(&BoundingBox::new(170.0, -20.0, -170.0, -10.0));
        assert_eq!(polygon["coordinates"][0][0], json!([170.0, -20.0]));
        assert_eq!(polygon["coordinates"][0][1], json!([-170.0, -20.0]));
    }

    proptest! {
        #[test]
        fn bbox_polygon_bounds_match(west in -180.0..170.0f64, south in -90.0..80.0f64,
                                     width in 0.001..10.0f64, height in 0.001..10.0f64) {
            let bbox = BoundingBox::new(west, south, west + width, south + height);
            let bounds = footprint_bounds(&bbox_to_geometry(&bbox)).unwrap();
            prop_assert_eq!(bounds, bbox);
        }
    }
}
