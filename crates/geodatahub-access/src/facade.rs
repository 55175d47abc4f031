use geodatahub_core::catalog::ProductInfo;
use geodatahub_core::error::{GeodatahubError, Result};
use geodatahub_core::models::{DataRequest, DownloadOutcome, SearchResult};
use geodatahub_core::ports::{ProviderGateway, ProviderQuery};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::convert::to_search_result;

/// Entry point for searching and downloading provider data
#[derive(Clone)]
pub struct DataHub {
    gateway: Arc<dyn ProviderGateway>,
}

impl DataHub {
    pub fn new(gateway: Arc<dyn ProviderGateway>) -> Self {
        Self { gateway }
    }

    /// Provider query for a request; the product defaults to Sentinel-2 L2A
    pub fn to_query(request: &DataRequest) -> ProviderQuery {
        ProviderQuery {
            product_type: request.effective_product().to_string(),
            bbox: request.bbox,
            start: request.start_date,
            end: request.end_date,
            cloud_cover_max: request.cloud_cover_max,
            provider: request.provider.clone(),
            limit: request.limit,
        }
    }

    /// Search for products matching `request`, in provider order
    pub async fn search(&self, request: &DataRequest) -> Result<Vec<SearchResult>> {
        request.validate()?;
        let query = Self::to_query(request);

        info!(request = %request, "Searching");
        let items = self.gateway.search(&query).await.inspect_err(|e| {
            warn!(error = %e, product = %query.product_type, "Search failed");
        })?;

        let results: Vec<SearchResult> = items
            .into_iter()
            .take(request.limit)
            .map(|item| to_search_result(item, request.data_type))
            .collect();

        info!(count = results.len(), "Search finished");
        Ok(results)
    }

    /// Download one result into `output_dir`, creating it if needed
    pub async fn download(&self, result: &SearchResult, output_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;
        self.gateway.download(result, output_dir).await
    }

    /// Download every result in order; one outcome per result
    pub async fn download_all(&self, results: &[SearchResult], output_dir: &Path) -> Vec<DownloadOutcome> {
        self.download_all_with_progress(results, output_dir, |_, _| {}).await
    }

    /// Like [`DataHub::download_all`], calling `on_done` after each item
    pub async fn download_all_with_progress<F>(
        &self,
        results: &[SearchResult],
        output_dir: &Path,
        mut on_done: F,
    ) -> Vec<DownloadOutcome>
    where
        F: FnMut(usize, &DownloadOutcome) + Send,
    {
        let mut outcomes = Vec::with_capacity(results.len());

        for (index, result) in results.iter().enumerate() {
            let outcome = match self.download(result, output_dir).await {
                Ok(path) => DownloadOutcome::downloaded(&result.id, path),
                Err(e) => {
                    warn!(id = %result.id, error = %e, "Download failed");
                    DownloadOutcome::failed(&result.id, e.to_string())
                }
            };
            on_done(index, &outcome);
            outcomes.push(outcome);
        }

        outcomes
    }

    pub async fn list_providers(&self) -> Result<Vec<String>> {
        self.gateway.list_providers().await
    }

    pub async fn list_products(&self, provider: Option<&str>) -> Result<Vec<ProductInfo>> {
        self.gateway.list_products(provider).await
    }

    /// Details of one product, `ProductNotFound` when no provider offers it
    pub async fn product_info(&self, id: &str, provider: Option<&str>) -> Result<ProductInfo> {
        self.list_products(provider)
            .await?
            .into_iter()
            .find(|p| p.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| GeodatahubError::ProductNotFound { id: id.to_string() })
    }
}
