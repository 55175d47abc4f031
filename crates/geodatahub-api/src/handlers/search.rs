use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use geodatahub_core::models::{DataRequest, RequestOverrides};

use crate::dto::request::check_limit;
use crate::dto::{NlSearchParams, SearchRequest, SearchResponse};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let overrides = request.overrides()?;
    let query = request.query_text();

    tracing::info!(
        query = query.unwrap_or_default(),
        explicit_fields = !overrides.is_empty(),
        limit = request.limit,
        "Processing search request"
    );

    let data_request = match query {
        Some(text) => state.parser.parse(text, &overrides).await?,
        None => state.parser.from_overrides(&overrides).await?,
    };

    run_search(&state, query.map(str::to_string), data_request).await
}

pub async fn search_nl(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NlSearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    check_limit(params.limit)?;
    tracing::info!(query = %params.q, limit = params.limit, "Processing natural language search");

    let overrides = RequestOverrides {
        limit: Some(params.limit),
        ..Default::default()
    };
    let data_request = state.parser.parse(&params.q, &overrides).await?;

    run_search(&state, Some(params.q), data_request).await
}

async fn run_search(
    state: &AppState,
    query: Option<String>,
    data_request: DataRequest,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = state.hub.search(&data_request).await.map_err(|e| {
        tracing::error!(error = %e, "Search failed");
        ApiError::from(e)
    })?;

    Ok(Json(SearchResponse {
        query,
        parsed_request: (&data_request).into(),
        count: results.len(),
        results,
    }))
}
