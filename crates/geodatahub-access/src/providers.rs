//! STAC provider definitions
//!
//! A providers file lists the STAC APIs to query and maps canonical product
//! codes to each API's collection ids:
//!
//! ```toml
//! [[provider]]
//! id = "earth_search"
//! url = "https://earth-search.aws.element84.com/v1"
//! priority = 8
//!
//! [provider.collections]
//! S2_MSI_L2A = "sentinel-2-l2a"
//! ```

use geodatahub_core::error::{GeodatahubError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

/// One STAC API endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacProvider {
    pub id: String,

    /// API root, `/search` is appended
    pub url: String,

    /// Higher is tried first
    #[serde(default)]
    pub priority: u8,

    /// Environment variable holding a bearer token for downloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Canonical product code to collection id
    #[serde(default)]
    pub collections: BTreeMap<String, String>,
}

impl StacProvider {
    pub fn new(id: &str, url: &str, priority: u8) -> Self {
        Self {
            id: id.to_string(),
            url: url.trim_end_matches('/').to_string(),
            priority,
            api_key_env: None,
            collections: BTreeMap::new(),
        }
    }

    pub fn with_collection(mut self, product: &str, collection: &str) -> Self {
        self.collections.insert(product.to_string(), collection.to_string());
        self
    }

    /// Collection id for a product code, matched case-insensitively
    pub fn collection_for(&self, product: &str) -> Option<&str> {
        self.collections
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(product))
            .map(|(_, collection)| collection.as_str())
    }

    pub fn offers(&self, product: &str) -> bool {
        self.collection_for(product).is_some()
    }

    /// Bearer token from the configured environment variable, if set
    pub fn api_key(&self) -> Option<String> {
        let name = self.api_key_env.as_deref()?;
        env::var(name).ok().filter(|key| !key.is_empty())
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.url.trim_end_matches('/'))
    }
}

/// The set of STAC providers a gateway talks to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(rename = "provider", default)]
    pub providers: Vec<StacProvider>,
}

impl ProvidersConfig {
    /// Earth Search and Planetary Computer, both open without credentials
    pub fn builtin() -> Self {
        let planetary_computer =
            StacProvider::new("planetary_computer", "https://planetarycomputer.microsoft.com/api/stac/v1", 9)
                .with_collection("S2_MSI_L2A", "sentinel-2-l2a")
                .with_collection("S1_SAR_GRD", "sentinel-1-grd")
                .with_collection("LANDSAT_C2L2", "landsat-c2-l2")
                .with_collection("MODIS_MOD09GA", "modis-09A1-061")
                .with_collection("COP-DEM_GLO-30", "cop-dem-glo-30")
                .with_collection("COP-DEM_GLO-90", "cop-dem-glo-90")
                .with_collection("ESA_WORLDCOVER", "esa-worldcover")
                .with_collection("ERA5", "era5-pds");

        let earth_search = StacProvider::new("earth_search", "https://earth-search.aws.element84.com/v1", 8)
            .with_collection("S2_MSI_L2A", "sentinel-2-l2a")
            .with_collection("S2_MSI_L1C", "sentinel-2-l1c")
            .with_collection("S1_SAR_GRD", "sentinel-1-grd")
            .with_collection("LANDSAT_C2L2", "landsat-c2-l2")
            .with_collection("COP-DEM_GLO-30", "cop-dem-glo-30")
            .with_collection("COP-DEM_GLO-90", "cop-dem-glo-90");

        Self {
            providers: vec![planetary_computer, earth_search],
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| GeodatahubError::ConfigInvalid {
            key: "providers_file".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GeodatahubError::ConfigInvalid {
            key: "providers_file".to_string(),
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Providers file when given, built-in providers otherwise
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(GeodatahubError::ConfigInvalid {
                key: "providers_file".to_string(),
                reason: "no [[provider]] entries".to_string(),
            });
        }

        let mut seen = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            if seen.contains(&provider.id.as_str()) {
                return Err(GeodatahubError::ConfigInvalid {
                    key: "providers_file".to_string(),
                    reason: format!("provider '{}' is listed twice", provider.id),
                });
            }
            seen.push(provider.id.as_str());

            reqwest::Url::parse(&provider.url).map_err(|e| GeodatahubError::ConfigInvalid {
                key: "providers_file".to_string(),
                reason: format!("provider '{}' has an invalid url: {}", provider.id, e),
            })?;
        }

        Ok(())
    }

    /// Providers ordered by priority, highest first; ties keep file order
    pub fn by_priority(&self) -> Vec<&StacProvider> {
        let mut providers: Vec<&StacProvider> = self.providers.iter().collect();
        providers.sort_by(|a, b| b.priority.cmp(&a.priority));
        providers
    }

    pub fn find(&self, id: &str) -> Option<&StacProvider> {
        self.providers.iter().find(|p| p.id == id)
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self::builtin()
    }
}
