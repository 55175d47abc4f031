pub mod bbox;
pub mod location;
pub mod request;
pub mod result;

pub use bbox::BoundingBox;
pub use location::{Location, ReverseLocation};
pub use request::{DataRequest, DataType, RequestOverrides, DEFAULT_LIMIT, DEFAULT_PRODUCT};
pub use result::{DownloadOutcome, DownloadStatus, SearchResult};
