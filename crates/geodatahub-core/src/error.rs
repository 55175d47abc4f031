//! Error types for GeoDataHub

use std::fmt;
use thiserror::Error;

/// Which provider-facing operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOperation {
    Search,
    Download,
    List,
}

impl fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderOperation::Search => write!(f, "search"),
            ProviderOperation::Download => write!(f, "download"),
            ProviderOperation::List => write!(f, "list"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeodatahubError {
    // Parsing errors
    #[error("Could not build a data request: {reason}")]
    ParseError { reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidRequest { field: String, reason: String },

    // LLM backend errors
    #[error("LLM backend {backend} unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    #[error("LLM backend {backend} failed: {reason}")]
    BackendError { backend: String, reason: String },

    // Geocoding errors
    #[error("Location not found: {location}")]
    LocationNotFound { location: String },

    #[error("Geocoder unavailable: {reason}")]
    GeocoderUnavailable { reason: String },

    // Provider errors
    #[error("Provider {operation} failed ({provider}): {message}")]
    Provider {
        operation: ProviderOperation,
        provider: String,
        message: String,
    },

    #[error("Product not found: {id}")]
    ProductNotFound { id: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeodatahubError {
    pub fn provider(
        operation: ProviderOperation,
        provider: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            operation,
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for LLM errors, which the parser always recovers from
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. } | Self::BackendError { .. })
    }

    /// True for geocoder errors, which degrade to a request without bbox
    pub fn is_geocoding_failure(&self) -> bool {
        matches!(self, Self::LocationNotFound { .. } | Self::GeocoderUnavailable { .. })
    }
}

impl From<serde_json::Error> for GeodatahubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeodatahubError>;
