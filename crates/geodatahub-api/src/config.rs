use geodatahub_core::config::LayeredConfig;
use std::env;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,

    /// Allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
}

impl ApiConfig {
    /// Port from the layered configuration, CORS origin from `GEODATAHUB_CORS_ORIGIN`
    pub fn from_layered(config: &LayeredConfig) -> Self {
        let cors_origin = env::var("GEODATAHUB_CORS_ORIGIN").ok().filter(|o| !o.is_empty());

        Self {
            port: config.api_port.value,
            cors_origin,
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: geodatahub_core::config::DEFAULT_API_PORT,
            cors_origin: None,
        }
    }
}
