use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use geodatahub_core::catalog::ProductInfo;

use crate::dto::{DataTypesResponse, ProductsResponse, ProviderParams, ProviderSummary, ProvidersResponse};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProviderParams>,
) -> Result<Json<ProductsResponse>, ApiError> {
    tracing::info!(provider = ?params.provider, "Listing products");

    let products = state.hub.list_products(params.provider.as_deref()).await?;
    Ok(Json(ProductsResponse {
        count: products.len(),
        provider: params.provider,
        products,
    }))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
    Query(params): Query<ProviderParams>,
) -> Result<Json<ProductInfo>, ApiError> {
    let info = state.hub.product_info(&product_id, params.provider.as_deref()).await?;
    Ok(Json(info))
}

pub async fn list_providers(State(state): State<Arc<AppState>>) -> Result<Json<ProvidersResponse>, ApiError> {
    let providers: Vec<ProviderSummary> = state
        .hub
        .list_providers()
        .await?
        .into_iter()
        .map(ProviderSummary::new)
        .collect();

    Ok(Json(ProvidersResponse {
        count: providers.len(),
        providers,
    }))
}

pub async fn list_data_types() -> impl IntoResponse {
    Json(DataTypesResponse::default())
}
