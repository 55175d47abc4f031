use geodatahub_access::DataHub;
use geodatahub_nlp::NlParser;
use std::sync::Arc;

use crate::config::ApiConfig;

/// Shared, read-only server state built once at startup
#[derive(Clone)]
pub struct AppState {
    pub parser: Arc<NlParser>,
    pub hub: DataHub,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(parser: Arc<NlParser>, hub: DataHub, config: ApiConfig) -> Self {
        Self { parser, hub, config }
    }
}
