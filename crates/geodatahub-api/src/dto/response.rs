use chrono::{DateTime, NaiveDate, Utc};
use geodatahub_core::catalog::{self, ProductInfo, Recommendation};
use geodatahub_core::models::{BoundingBox, DataRequest, DataType, SearchResult};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::dto::request::DatasourceParams;

/// API root response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

impl Default for RootResponse {
    fn default() -> Self {
        let endpoints = BTreeMap::from([
            ("search", "/search"),
            ("search_nl", "/search/nl"),
            ("products", "/products"),
            ("providers", "/providers"),
            ("data_types", "/data-types"),
            ("datasources", "/datasources"),
            ("datasource_categories", "/datasources/categories/list"),
            ("datasources_recommend", "/datasources/recommend"),
        ]);

        Self {
            message: "GeoDataHub API",
            version: env!("CARGO_PKG_VERSION"),
            endpoints,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,

    /// LLM backend used for parsing; `None` means rules only
    pub llm_backend: Option<String>,
}

impl HealthResponse {
    pub fn ok(llm_backend: Option<&str>) -> Self {
        Self {
            status: "ok",
            service: "geodatahub-api",
            timestamp: Utc::now(),
            llm_backend: llm_backend.map(str::to_string),
        }
    }
}

/// The structured request a search ran with
#[derive(Debug, Serialize)]
pub struct ParsedRequest {
    pub product: Option<String>,
    pub data_type: Option<DataType>,
    pub location: Option<String>,
    pub bbox: Option<BoundingBox>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub cloud_cover_max: Option<f64>,
    pub provider: Option<String>,
    pub limit: usize,
}

impl From<&DataRequest> for ParsedRequest {
    fn from(request: &DataRequest) -> Self {
        Self {
            product: request.product.clone(),
            data_type: request.data_type,
            location: request.location_name.clone(),
            bbox: request.bbox,
            start_date: request.start_date,
            end_date: request.end_date,
            cloud_cover_max: request.cloud_cover_max,
            provider: request.provider.clone(),
            limit: request.limit,
        }
    }
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: Option<String>,
    pub parsed_request: ParsedRequest,
    pub count: usize,
    pub results: Vec<SearchResult>,
}

/// Product listing response
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub count: usize,
    pub provider: Option<String>,
    pub products: Vec<ProductInfo>,
}

/// A provider id with catalog details when known
#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_auth: Option<bool>,
}

impl ProviderSummary {
    pub fn new(id: String) -> Self {
        let info = geodatahub_core::catalog::find_provider(&id);
        Self {
            name: info.map(|p| p.name),
            url: info.map(|p| p.url),
            requires_auth: info.map(|p| p.requires_auth),
            id,
        }
    }
}

/// Provider listing response
#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub count: usize,
    pub providers: Vec<ProviderSummary>,
}

/// Supported data types
#[derive(Debug, Serialize)]
pub struct DataTypesResponse {
    pub data_types: Vec<&'static str>,
}

impl Default for DataTypesResponse {
    fn default() -> Self {
        Self {
            data_types: DataType::ALL.iter().map(|t| t.as_str()).collect(),
        }
    }
}

/// Catalog entries matching the datasource filters
#[derive(Debug, Serialize)]
pub struct DatasourcesResponse {
    pub count: usize,
    pub filter: DatasourceParams,
    pub datasources: Vec<ProductInfo>,
}

/// A data type with the number of catalog products in it
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub id: &'static str,
    pub name: String,
    pub count: usize,
}

impl CategorySummary {
    pub fn new(data_type: DataType) -> Self {
        let name = data_type
            .as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                chars
                    .next()
                    .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: data_type.as_str(),
            name,
            count: catalog::products_of_type(data_type).len(),
        }
    }
}

/// Data source categories
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategorySummary>,
}

impl Default for CategoriesResponse {
    fn default() -> Self {
        Self {
            categories: DataType::ALL.into_iter().map(CategorySummary::new).collect(),
        }
    }
}

/// Product recommendations for an analysis description
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub analysis: String,
    pub count: usize,
    pub recommendations: Vec<Recommendation>,
}
