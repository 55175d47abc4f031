//! In-memory provider gateway for development and testing.
//!
//! Searches filter a fixed set of items; downloads write the item as JSON.
//! Ids registered with [`MemoryGateway::fail_download`] make downloads fail.

use async_trait::async_trait;
use chrono::NaiveDate;
use geodatahub_core::catalog::{self, ProductInfo};
use geodatahub_core::error::{GeodatahubError, ProviderOperation, Result};
use geodatahub_core::models::{BoundingBox, SearchResult};
use geodatahub_core::ports::{ProviderGateway, ProviderItem, ProviderQuery};
use geodatahub_geo::footprint_bounds;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::convert::file_stem;

const DEFAULT_PROVIDER: &str = "memory";

/// In-memory implementation of ProviderGateway
#[derive(Debug, Default)]
pub struct MemoryGateway {
    items: RwLock<Vec<ProviderItem>>,
    failing: RwLock<HashSet<String>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = ProviderItem>) -> Self {
        let gateway = Self::new();
        for item in items {
            gateway.add_item(item);
        }
        gateway
    }

    /// Add an item; items without a provider are attributed to "memory"
    pub fn add_item(&self, mut item: ProviderItem) {
        if item.provider.is_empty() {
            item.provider = DEFAULT_PROVIDER.to_string();
        }
        self.items.write().unwrap_or_else(PoisonError::into_inner).push(item);
    }

    /// Make downloads of `id` fail
    pub fn fail_download(&self, id: impl Into<String>) {
        self.failing.write().unwrap_or_else(PoisonError::into_inner).insert(id.into());
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn item_bounds(item: &ProviderItem) -> Option<BoundingBox> {
    item.bbox
        .as_deref()
        .and_then(|values| BoundingBox::from_slice(values).ok())
        .or_else(|| item.geometry.as_ref().and_then(footprint_bounds))
}

fn item_date(item: &ProviderItem) -> Option<NaiveDate> {
    let datetime = item.properties.get("datetime")?.as_str()?;
    NaiveDate::parse_from_str(datetime.get(..10)?, "%Y-%m-%d").ok()
}

fn matches(item: &ProviderItem, query: &ProviderQuery) -> bool {
    if !item.product_type.eq_ignore_ascii_case(&query.product_type) {
        return false;
    }
    if let Some(ref provider) = query.provider {
        if &item.provider != provider {
            return false;
        }
    }
    if let Some(ref bbox) = query.bbox {
        if !item_bounds(item).is_some_and(|bounds| bounds.intersects(bbox)) {
            return false;
        }
    }
    if query.start.is_some() || query.end.is_some() {
        let Some(date) = item_date(item) else {
            return false;
        };
        if query.start.is_some_and(|start| date < start) || query.end.is_some_and(|end| date > end) {
            return false;
        }
    }
    if let Some(max) = query.cloud_cover_max {
        let cloud = item.properties.get("eo:cloud_cover").and_then(|v| v.as_f64());
        if cloud.is_some_and(|cloud| cloud > max) {
            return false;
        }
    }
    true
}

#[async_trait]
impl ProviderGateway for MemoryGateway {
    async fn search(&self, query: &ProviderQuery) -> Result<Vec<ProviderItem>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items
            .iter()
            .filter(|item| matches(item, query))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn download(&self, result: &SearchResult, output_dir: &Path) -> Result<PathBuf> {
        let fail = |message: &str| GeodatahubError::provider(ProviderOperation::Download, &result.provider, message);

        if self.failing.read().unwrap_or_else(PoisonError::into_inner).contains(&result.id) {
            return Err(fail("product is offline"));
        }

        let item = self
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|item| item.id == result.id)
            .cloned()
            .ok_or_else(|| fail("unknown item"))?;

        let path = output_dir.join(format!("{}.json", file_stem(&item.id)));
        tokio::fs::write(&path, serde_json::to_vec_pretty(&item)?).await?;
        Ok(path)
    }

    async fn list_providers(&self) -> Result<Vec<String>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let mut providers: Vec<String> = Vec::new();
        for item in items.iter() {
            if !providers.contains(&item.provider) {
                providers.push(item.provider.clone());
            }
        }
        Ok(providers)
    }

    async fn list_products(&self, provider: Option<&str>) -> Result<Vec<ProductInfo>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let mut products: Vec<ProductInfo> = Vec::new();

        for item in items.iter().filter(|item| provider.map_or(true, |p| item.provider == p)) {
            match products.iter_mut().find(|p| p.id.eq_ignore_ascii_case(&item.product_type)) {
                Some(existing) => {
                    if !existing.providers.contains(&item.provider) {
                        existing.providers.push(item.provider.clone());
                    }
                }
                None => {
                    let mut info = catalog::find_product(&item.product_type)
                        .map(ProductInfo::from)
                        .unwrap_or_else(|| ProductInfo::unlisted(&item.product_type, &item.provider));
                    info.providers = vec![item.provider.clone()];
                    products.push(info);
                }
            }
        }

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, product: &str, date: &str, cloud: f64, bbox: [f64; 4]) -> ProviderItem {
        serde_json::from_value(json!({
            "id": id,
            "product_type": product,
            "bbox": bbox,
            "properties": {"datetime": format!("{}T10:00:00Z", date), "eo:cloud_cover": cloud}
        }))
        .unwrap()
    }

    fn gateway() -> MemoryGateway {
        MemoryGateway::with_items([
            item("paris-jan", "S2_MSI_L2A", "2024-01-10", 5.0, [2.0, 48.5, 2.6, 49.0]),
            item("paris-cloudy", "S2_MSI_L2A", "2024-01-20", 80.0, [2.0, 48.5, 2.6, 49.0]),
            item("paris-feb", "S2_MSI_L2A", "2024-02-10", 5.0, [2.0, 48.5, 2.6, 49.0]),
            item("tokyo-jan", "S2_MSI_L2A", "2024-01-12", 5.0, [139.5, 35.5, 139.9, 35.8]),
            item("paris-sar", "S1_SAR_GRD", "2024-01-15", 0.0, [2.0, 48.5, 2.6, 49.0]),
        ])
    }

    fn query() -> ProviderQuery {
        ProviderQuery {
            product_type: "S2_MSI_L2A".to_string(),
            bbox: Some(BoundingBox::new(2.22, 48.81, 2.47, 48.90)),
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: NaiveDate::from_ymd_opt(2024, 1, 31),
            cloud_cover_max: Some(20.0),
            provider: None,
            limit: 10,
        }
    }

    #[tokio::test]
    async fn test_search_filters() {
        let gateway = gateway();
        let ids: Vec<String> = gateway.search(&query()).await.unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["paris-jan"]);

        let loose = ProviderQuery { bbox: None, start: None, end: None, cloud_cover_max: None, ..query() };
        assert_eq!(gateway.search(&loose).await.unwrap().len(), 4);

        let limited = ProviderQuery { limit: 2, ..loose };
        assert_eq!(gateway.search(&limited).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_introspection() {
        let gateway = gateway();
        assert_eq!(gateway.list_providers().await.unwrap(), vec!["memory"]);

        let products = gateway.list_products(None).await.unwrap();
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["S2_MSI_L2A", "S1_SAR_GRD"]);
        assert_eq!(products[0].title, catalog::find_product("S2_MSI_L2A").unwrap().title);

        assert!(gateway.list_products(Some("elsewhere")).await.unwrap().is_empty());
    }
}
