//! GeoDataHub Core - Domain models, configuration and ports
//!
//! This crate holds the structured request/result model shared by every
//! surface, the error taxonomy, layered configuration, the static product
//! catalog and the port traits implemented by the geocoder and provider crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{GeodatahubError, ProviderOperation, Result};
