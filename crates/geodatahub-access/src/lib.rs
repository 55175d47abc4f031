//! GeoDataHub Access - Provider search and download
//!
//! The `DataHub` facade translates a `DataRequest` into a provider query,
//! normalizes the answers into `SearchResult`s and fetches files. Providers
//! sit behind the `ProviderGateway` port: a STAC API client for real catalogs
//! and an in-memory gateway for tests and offline use.

pub mod convert;
pub mod facade;
pub mod memory;
pub mod providers;
pub mod stac;

pub use convert::to_search_result;
pub use facade::DataHub;
pub use memory::MemoryGateway;
pub use providers::{ProvidersConfig, StacProvider};
pub use stac::StacGateway;
