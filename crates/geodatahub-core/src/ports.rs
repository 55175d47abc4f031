//! Port definitions implemented by the adapter crates

pub mod gateway;
pub mod geocoder;

pub use gateway::{Asset, ProviderGateway, ProviderItem, ProviderQuery};
pub use geocoder::Geocoder;
