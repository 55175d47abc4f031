//! Natural-language request parser
//!
//! Runs an ordered list of extraction strategies (LLM first when a backend
//! is configured, rules last), then applies caller overrides and resolves the
//! place name to a bounding box.

use chrono::NaiveDate;
use geodatahub_core::error::{GeodatahubError, Result};
use geodatahub_core::models::{DataRequest, DataType, RequestOverrides, DEFAULT_LIMIT};
use geodatahub_core::ports::Geocoder;
use geodatahub_llm::CompletionBackend;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::extract::{extract, ExtractedFields};
use crate::llm_schema::LlmParse;
use crate::prompt::build_prompt;

/// One way of pulling fields out of a query
#[derive(Clone)]
pub enum Strategy {
    Llm(Arc<dyn CompletionBackend>),
    Regex,
}

impl Strategy {
    pub fn name(&self) -> &str {
        match self {
            Strategy::Llm(backend) => backend.name(),
            Strategy::Regex => "regex",
        }
    }

    async fn run(&self, query: &str, today: NaiveDate) -> Result<ExtractedFields> {
        match self {
            Strategy::Llm(backend) => {
                let reply = backend.complete(&build_prompt(query, today)).await?;
                Ok(LlmParse::from_reply(&reply)?.into_fields())
            }
            Strategy::Regex => Ok(extract(query, today)),
        }
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Llm(backend) => f.debug_tuple("Llm").field(&backend.name()).finish(),
            Strategy::Regex => f.write_str("Regex"),
        }
    }
}

/// Turns free text into a validated [`DataRequest`]
pub struct NlParser {
    strategies: Vec<Strategy>,
    geocoder: Arc<dyn Geocoder>,
}

impl NlParser {
    /// Parser trying `backend` first (when given), then the rule-based extractor
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>, geocoder: Arc<dyn Geocoder>) -> Self {
        let mut strategies = Vec::with_capacity(2);
        if let Some(backend) = backend {
            strategies.push(Strategy::Llm(backend));
        }
        strategies.push(Strategy::Regex);

        Self { strategies, geocoder }
    }

    pub fn regex_only(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::new(None, geocoder)
    }

    /// Name of the LLM backend in use, if any
    pub fn backend_name(&self) -> Option<&str> {
        self.strategies.iter().find_map(|strategy| match strategy {
            Strategy::Llm(backend) => Some(backend.name()),
            Strategy::Regex => None,
        })
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Parse `query` with relative dates resolved against the local date
    pub async fn parse(&self, query: &str, overrides: &RequestOverrides) -> Result<DataRequest> {
        self.parse_at(query, overrides, chrono::Local::now().date_naive()).await
    }

    /// Parse `query` as of `today`
    ///
    /// Fails with `ParseError` only when neither the query nor the overrides
    /// name a product or a date. LLM and geocoder failures degrade silently.
    pub async fn parse_at(
        &self,
        query: &str,
        overrides: &RequestOverrides,
        today: NaiveDate,
    ) -> Result<DataRequest> {
        let fields = self.extract_fields(query, today).await;

        let mut request = DataRequest {
            product: fields.product,
            data_type: fields.data_type,
            provider: fields.provider,
            bbox: fields.bbox,
            location_name: fields.location,
            start_date: fields.start_date,
            end_date: fields.end_date,
            cloud_cover_max: fields.cloud_cover_max,
            limit: DEFAULT_LIMIT,
        };

        request.apply(overrides);
        if overrides.product.is_some() && overrides.data_type.is_none() {
            request.data_type = None;
        }
        if overrides.location_name.is_some() && overrides.bbox.is_none() {
            request.bbox = None;
        }
        // An overridden bound replaces an extracted one it contradicts
        match (overrides.start_date, overrides.end_date) {
            (Some(start), None) if request.end_date.is_some_and(|end| end < start) => {
                request.end_date = None;
            }
            (None, Some(end)) if request.start_date.is_some_and(|start| start > end) => {
                request.start_date = None;
            }
            _ => {}
        }

        if !request.has_search_signal() {
            return Err(GeodatahubError::ParseError {
                reason: format!("no product or date found in '{}'", query),
            });
        }

        self.resolve_location(&mut request).await;

        if request.data_type.is_none() {
            request.data_type = request.product.as_deref().and_then(DataType::infer_from_product);
        }

        request.validate()?;
        debug!(request = %request, "Parsed query");
        Ok(request)
    }

    /// Build a request from explicit fields alone, geocoding the place name
    ///
    /// No product or date is required; the search falls back to the default
    /// product.
    pub async fn from_overrides(&self, overrides: &RequestOverrides) -> Result<DataRequest> {
        let mut request = overrides.to_request();
        self.resolve_location(&mut request).await;
        if request.data_type.is_none() {
            request.data_type = request.product.as_deref().and_then(DataType::infer_from_product);
        }
        request.validate()?;
        Ok(request)
    }

    async fn extract_fields(&self, query: &str, today: NaiveDate) -> ExtractedFields {
        let mut last = ExtractedFields::default();

        for strategy in &self.strategies {
            match strategy.run(query, today).await {
                Ok(fields) if fields.is_complete_enough() => {
                    debug!(strategy = strategy.name(), "Extraction succeeded");
                    return fields;
                }
                Ok(fields) => {
                    warn!(strategy = strategy.name(), "Extraction found no product or date, trying next strategy");
                    last = fields;
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Extraction failed, trying next strategy");
                }
            }
        }

        last
    }

    /// Fill `bbox` from the place name unless one is already set
    async fn resolve_location(&self, request: &mut DataRequest) {
        if request.bbox.is_some() {
            return;
        }
        let Some(place) = request.location_name.as_deref() else {
            return;
        };

        match self.geocoder.geocode(place).await {
            Ok(location) => match location.bbox.validate() {
                Ok(()) => {
                    info!(place, bbox = %location.bbox, "Resolved location");
                    request.bbox = Some(location.bbox);
                }
                Err(e) => {
                    warn!(place, error = %e, "Geocoder returned an invalid bbox, searching without bbox");
                }
            },
            Err(e) => {
                warn!(place, error = %e, "Could not resolve location, searching without bbox");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodatahub_geo::StaticGeocoder;

    #[test]
    fn test_strategy_order() {
        let parser = NlParser::regex_only(Arc::new(StaticGeocoder::new()));
        assert_eq!(parser.strategies().len(), 1);
        assert_eq!(parser.backend_name(), None);
        assert_eq!(parser.strategies()[0].name(), "regex");
    }

    #[tokio::test]
    async fn test_override_product_reinfers_type() {
        let parser = NlParser::regex_only(Arc::new(StaticGeocoder::new()));
        let overrides = RequestOverrides {
            product: Some("COP-DEM_GLO-30".to_string()),
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let request = parser.parse_at("Sentinel-2 yesterday", &overrides, today).await.unwrap();

        assert_eq!(request.product.as_deref(), Some("COP-DEM_GLO-30"));
        assert_eq!(request.data_type, Some(DataType::Dem));
    }

    #[tokio::test]
    async fn test_start_override_drops_contradicting_end() {
        let parser = NlParser::regex_only(Arc::new(StaticGeocoder::new()));
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let overrides = RequestOverrides { start_date: Some(start), ..Default::default() };

        let request = parser.parse_at("Sentinel-2 last week", &overrides, today).await.unwrap();
        assert_eq!(request.start_date, Some(start));
        assert_eq!(request.end_date, None);
    }

    #[tokio::test]
    async fn test_end_override_drops_contradicting_start() {
        let parser = NlParser::regex_only(Arc::new(StaticGeocoder::new()));
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let overrides = RequestOverrides { end_date: Some(end), ..Default::default() };

        let request = parser.parse_at("Sentinel-2 last week", &overrides, today).await.unwrap();
        assert_eq!(request.start_date, None);
        assert_eq!(request.end_date, Some(end));
    }

    #[tokio::test]
    async fn test_consistent_one_sided_override_keeps_other_bound() {
        let parser = NlParser::regex_only(Arc::new(StaticGeocoder::new()));
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let overrides = RequestOverrides { start_date: Some(start), ..Default::default() };

        let request = parser.parse_at("Sentinel-2 last week", &overrides, today).await.unwrap();
        assert_eq!(request.start_date, Some(start));
        assert_eq!(request.end_date, Some(today));
    }

    #[tokio::test]
    async fn test_invalid_geocoded_bbox_is_dropped() {
        let geocoder = StaticGeocoder::new()
            .with_place("Nowhere", geodatahub_core::models::BoundingBox::new(0.0, 60.0, 1.0, 50.0));
        let parser = NlParser::regex_only(Arc::new(geocoder));
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let request = parser
            .parse_at("Sentinel-2 images of Nowhere yesterday", &RequestOverrides::default(), today)
            .await
            .unwrap();
        assert_eq!(request.location_name.as_deref(), Some("Nowhere"));
        assert_eq!(request.bbox, None);
    }
}
