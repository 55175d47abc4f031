use axum::{
    extract::{Path, Query},
    Json,
};
use geodatahub_core::catalog::{self, ProductInfo};
use geodatahub_core::models::DataType;

use crate::dto::{CategoriesResponse, DatasourceParams, DatasourcesResponse};
use crate::error::ApiError;

/// Catalog entries, filtered by category and keyword when given
pub async fn list_datasources(
    Query(params): Query<DatasourceParams>,
) -> Result<Json<DatasourcesResponse>, ApiError> {
    let category = match params.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(value) => Some(value.parse::<DataType>()?),
        None => None,
    };
    let keyword = params.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty());

    let mut sources = match keyword {
        Some(keyword) => catalog::products_matching(keyword),
        None => catalog::PRODUCTS.iter().collect(),
    };
    if let Some(data_type) = category {
        sources.retain(|p| p.data_type == data_type);
    }
    tracing::info!(category = ?category, keyword = ?keyword, count = sources.len(), "Listing data sources");

    let datasources: Vec<ProductInfo> = sources.into_iter().map(ProductInfo::from).collect();
    Ok(Json(DatasourcesResponse {
        count: datasources.len(),
        filter: params,
        datasources,
    }))
}

pub async fn get_datasource(Path(source_id): Path<String>) -> Result<Json<ProductInfo>, ApiError> {
    catalog::find_product(&source_id)
        .map(|entry| Json(ProductInfo::from(entry)))
        .ok_or_else(|| {
            ApiError::not_found(format!("Data source {} not found", source_id))
                .with_details("Use GET /datasources to see available sources")
        })
}

pub async fn list_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse::default())
}
