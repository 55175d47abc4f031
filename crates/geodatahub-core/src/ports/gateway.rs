use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::ProductInfo;
use crate::error::Result;
use crate::models::{BoundingBox, SearchResult};

/// Query in the provider gateway's calling convention
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderQuery {
    pub product_type: String,
    pub bbox: Option<BoundingBox>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub cloud_cover_max: Option<f64>,

    /// Restrict the search to this provider
    pub provider: Option<String>,

    pub limit: usize,
}

impl ProviderQuery {
    /// RFC 3339 interval covering whole days, `..` for an open end
    pub fn datetime_interval(&self) -> Option<String> {
        if self.start.is_none() && self.end.is_none() {
            return None;
        }
        let start = self
            .start
            .map(|d| format!("{}T00:00:00Z", d))
            .unwrap_or_else(|| "..".to_string());
        let end = self
            .end
            .map(|d| format!("{}T23:59:59Z", d))
            .unwrap_or_else(|| "..".to_string());
        Some(format!("{}/{}", start, end))
    }
}

/// A provider's native search hit (STAC item shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderItem {
    pub id: String,

    /// Provider that answered
    #[serde(default)]
    pub provider: String,

    /// Canonical product code the item was searched under
    #[serde(default)]
    pub product_type: String,

    #[serde(default)]
    pub geometry: Option<Value>,

    #[serde(default)]
    pub bbox: Option<Vec<f64>>,

    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
}

/// Downloadable file attached to an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Size in bytes
    #[serde(rename = "file:size", default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

/// Port for provider search, download and introspection
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Run a search; items come back in provider order
    async fn search(&self, query: &ProviderQuery) -> Result<Vec<ProviderItem>>;

    /// Fetch one result into `output_dir`, returning the written path
    async fn download(&self, result: &SearchResult, output_dir: &Path) -> Result<PathBuf>;

    /// Names of usable providers, preferred first
    async fn list_providers(&self) -> Result<Vec<String>>;

    /// Products offered, optionally by a single provider
    async fn list_products(&self, provider: Option<&str>) -> Result<Vec<ProductInfo>>;
}
