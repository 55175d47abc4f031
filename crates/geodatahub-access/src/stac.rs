use async_trait::async_trait;
use geodatahub_core::catalog::{self, ProductInfo};
use geodatahub_core::config::LayeredConfig;
use geodatahub_core::error::{GeodatahubError, ProviderOperation, Result};
use geodatahub_core::models::{DataType, SearchResult};
use geodatahub_core::ports::{ProviderGateway, ProviderItem, ProviderQuery};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::convert::{file_extension, file_stem};
use crate::providers::{ProvidersConfig, StacProvider};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Page of a STAC item search
#[derive(Debug, Deserialize)]
struct ItemCollection {
    #[serde(default)]
    features: Vec<ProviderItem>,
}

/// Provider gateway speaking the STAC API over HTTP
pub struct StacGateway {
    config: ProvidersConfig,
    client: reqwest::Client,
}

impl StacGateway {
    pub fn new(config: ProvidersConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("GeoDataHub/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                GeodatahubError::provider(ProviderOperation::Search, "stac", format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Gateway over the providers file named in the configuration, or the built-in providers
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        Self::new(ProvidersConfig::load_or_builtin(config.providers_file.value.as_deref())?)
    }

    pub fn providers(&self) -> &ProvidersConfig {
        &self.config
    }

    /// Providers to try for a query, in order
    fn candidates(&self, query: &ProviderQuery) -> Result<Vec<&StacProvider>> {
        if let Some(ref hint) = query.provider {
            let provider = self.config.find(hint).ok_or_else(|| {
                GeodatahubError::provider(ProviderOperation::Search, hint, "unknown provider")
            })?;
            if !provider.offers(&query.product_type) {
                return Err(GeodatahubError::provider(
                    ProviderOperation::Search,
                    hint,
                    format!("product {} is not offered", query.product_type),
                ));
            }
            return Ok(vec![provider]);
        }

        let candidates: Vec<&StacProvider> = self
            .config
            .by_priority()
            .into_iter()
            .filter(|p| p.offers(&query.product_type))
            .collect();

        if candidates.is_empty() {
            return Err(GeodatahubError::ProductNotFound {
                id: query.product_type.clone(),
            });
        }
        Ok(candidates)
    }

    async fn search_provider(&self, provider: &StacProvider, query: &ProviderQuery) -> Result<Vec<ProviderItem>> {
        let fail = |message: String| GeodatahubError::provider(ProviderOperation::Search, &provider.id, message);

        let collection = provider
            .collection_for(&query.product_type)
            .ok_or_else(|| fail(format!("product {} is not offered", query.product_type)))?;
        let body = search_body(collection, query);

        tracing::debug!(provider = %provider.id, collection, body = %body, "STAC search");

        let response = self
            .client
            .post(provider.search_url())
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(fail(format!("HTTP {}: {}", status, text.chars().take(200).collect::<String>())));
        }

        let page: ItemCollection = response
            .json()
            .await
            .map_err(|e| fail(format!("invalid search response: {}", e)))?;

        Ok(page
            .features
            .into_iter()
            .take(query.limit)
            .map(|mut item| {
                item.provider = provider.id.clone();
                item.product_type = query.product_type.clone();
                item
            })
            .collect())
    }
}

/// STAC `/search` body for one collection
fn search_body(collection: &str, query: &ProviderQuery) -> Value {
    let mut body = Map::new();
    body.insert("collections".to_string(), json!([collection]));
    body.insert("limit".to_string(), json!(query.limit));

    if let Some(bbox) = query.bbox {
        body.insert("bbox".to_string(), json!(bbox.as_array()));
    }
    if let Some(interval) = query.datetime_interval() {
        body.insert("datetime".to_string(), json!(interval));
    }
    // Only optical scenes carry eo:cloud_cover; filtering others would drop every item
    if let Some(cloud) = query.cloud_cover_max {
        if DataType::infer_from_product(&query.product_type) == Some(DataType::Optical) {
            body.insert("query".to_string(), json!({"eo:cloud_cover": {"lte": cloud}}));
        }
    }

    Value::Object(body)
}

#[async_trait]
impl ProviderGateway for StacGateway {
    async fn search(&self, query: &ProviderQuery) -> Result<Vec<ProviderItem>> {
        let mut last_error = None;

        for provider in self.candidates(query)? {
            match self.search_provider(provider, query).await {
                Ok(items) => {
                    tracing::info!(provider = %provider.id, count = items.len(), "STAC search succeeded");
                    return Ok(items);
                }
                Err(e) => {
                    tracing::warn!(provider = %provider.id, error = %e, "STAC search failed, trying next provider");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GeodatahubError::ProductNotFound {
            id: query.product_type.clone(),
        }))
    }

    async fn download(&self, result: &SearchResult, output_dir: &Path) -> Result<PathBuf> {
        let fail = |message: String| GeodatahubError::provider(ProviderOperation::Download, &result.provider, message);

        let url = result
            .download_url
            .as_deref()
            .ok_or_else(|| fail(format!("{} has no downloadable asset", result.id)))?;

        let mut request = self.client.get(url);
        if let Some(key) = self.config.find(&result.provider).and_then(StacProvider::api_key) {
            request = request.bearer_auth(key);
        }

        let mut response = request.send().await.map_err(|e| fail(format!("request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("HTTP {} for {}", status, url)));
        }

        let media_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let path = output_dir.join(format!(
            "{}.{}",
            file_stem(&result.id),
            file_extension(url, media_type.as_deref())
        ));
        let partial = path.with_extension("part");

        let mut file = tokio::fs::File::create(&partial).await?;
        // Any failure past this point removes the partial file
        let transfer = async {
            let mut written: u64 = 0;
            while let Some(chunk) =
                response.chunk().await.map_err(|e| format!("transfer interrupted: {}", e))?
            {
                file.write_all(&chunk).await.map_err(|e| format!("write failed: {}", e))?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(|e| format!("write failed: {}", e))?;
            drop(file);
            tokio::fs::rename(&partial, &path)
                .await
                .map_err(|e| format!("could not move download to {}: {}", path.display(), e))?;
            Ok::<u64, String>(written)
        };
        let written = match transfer.await {
            Ok(written) => written,
            Err(reason) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(fail(reason));
            }
        };

        tracing::info!(id = %result.id, path = %path.display(), bytes = written, "Downloaded");
        Ok(path)
    }

    async fn list_providers(&self) -> Result<Vec<String>> {
        Ok(self.config.by_priority().into_iter().map(|p| p.id.clone()).collect())
    }

    async fn list_products(&self, provider: Option<&str>) -> Result<Vec<ProductInfo>> {
        let providers = match provider {
            Some(id) => vec![self.config.find(id).ok_or_else(|| {
                GeodatahubError::provider(ProviderOperation::List, id, "unknown provider")
            })?],
            None => self.config.by_priority(),
        };

        let mut products: Vec<ProductInfo> = Vec::new();
        for provider in providers {
            for code in provider.collections.keys() {
                match products.iter_mut().find(|p| p.id.eq_ignore_ascii_case(code)) {
                    Some(existing) => existing.providers.push(provider.id.clone()),
                    None => {
                        let mut info = catalog::find_product(code)
                            .map(ProductInfo::from)
                            .unwrap_or_else(|| ProductInfo::unlisted(code, &provider.id));
                        info.providers = vec![provider.id.clone()];
                        products.push(info);
                    }
                }
            }
        }

        Ok(products)
    }
}
