use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))

        // Search
        .route("/search", post(handlers::search))
        .route("/search/nl", get(handlers::search_nl))

        // Catalog
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product))
        .route("/providers", get(handlers::list_providers))
        .route("/data-types", get(handlers::list_data_types))

        // Data sources
        .route("/datasources", get(handlers::list_datasources))
        .route("/datasources/categories/list", get(handlers::list_categories))
        .route("/datasources/recommend", post(handlers::recommend_datasources))
        .route("/datasources/{source_id}", get(handlers::get_datasource))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
