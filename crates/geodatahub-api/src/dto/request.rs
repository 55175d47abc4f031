use chrono::NaiveDate;
use geodatahub_core::models::{BoundingBox, DataType, RequestOverrides, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Largest page a client may ask for
pub const MAX_LIMIT: usize = 100;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_recommend_limit() -> usize {
    5
}

/// Reject limits outside 1..=100
pub fn check_limit(limit: usize) -> Result<(), ApiError> {
    if (1..=MAX_LIMIT).contains(&limit) {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid limit")
            .with_details(format!("limit must be between 1 and {}, got {}", MAX_LIMIT, limit)))
    }
}

/// Search request body: a natural language query, explicit fields, or both
///
/// Explicit fields win over values parsed from the query.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub product: Option<String>,
    pub data_type: Option<String>,
    pub bbox: Option<Vec<f64>>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub cloud_cover_max: Option<f64>,
    pub provider: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl SearchRequest {
    /// Query text, `None` when missing or blank
    pub fn query_text(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Explicit fields as parser overrides
    pub fn overrides(&self) -> Result<RequestOverrides, ApiError> {
        check_limit(self.limit)?;

        let bbox = match self.bbox {
            Some(ref values) => Some(BoundingBox::from_slice(values)?),
            None => None,
        };
        let data_type = match self.data_type {
            Some(ref value) => Some(value.parse::<DataType>()?),
            None => None,
        };

        Ok(RequestOverrides {
            product: self.product.clone(),
            data_type,
            provider: self.provider.clone(),
            bbox,
            location_name: self.location.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            cloud_cover_max: self.cloud_cover_max,
            limit: Some(self.limit),
        })
    }
}

/// Query string of `GET /search/nl`
#[derive(Debug, Deserialize)]
pub struct NlSearchParams {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Optional provider filter
#[derive(Debug, Default, Deserialize)]
pub struct ProviderParams {
    pub provider: Option<String>,
}

/// Catalog filters of `GET /datasources`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DatasourceParams {
    pub category: Option<String>,
    pub keyword: Option<String>,
}

/// Description of an intended analysis
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub analysis_description: String,
    #[serde(default = "default_recommend_limit")]
    pub limit: usize,
}
