//! GeoDataHub Geo - Geocoding adapters and footprint helpers
//!
//! Implements the `Geocoder` port against Nominatim and an in-memory table,
//! and converts between GeoJSON footprints and bounding boxes.

pub mod footprint;
pub mod nominatim;
pub mod static_geocoder;

pub use footprint::{bbox_to_geometry, footprint_bounds, point_geometry};
pub use nominatim::NominatimGeocoder;
pub use static_geocoder::StaticGeocoder;
