use axum::Json;
use geodatahub_core::catalog;

use crate::dto::request::check_limit;
use crate::dto::{RecommendRequest, RecommendResponse};
use crate::error::ApiError;

pub async fn recommend_datasources(
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    check_limit(request.limit)?;
    if request.analysis_description.trim().is_empty() {
        return Err(ApiError::bad_request("analysis_description must not be empty"));
    }

    let recommendations = catalog::recommend(&request.analysis_description, request.limit);
    tracing::info!(count = recommendations.len(), "Recommended products");

    Ok(Json(RecommendResponse {
        analysis: request.analysis_description,
        count: recommendations.len(),
        recommendations,
    }))
}
