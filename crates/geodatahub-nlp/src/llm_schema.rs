//! Decoding of the JSON object a completion backend replies with

use chrono::NaiveDate;
use geodatahub_core::error::{GeodatahubError, Result};
use geodatahub_core::models::{BoundingBox, DataType};
use geodatahub_llm::util::{extract_json_object, strip_code_blocks};
use serde_json::{Map, Value};

use crate::extract::{extract_product, ExtractedFields};

/// Fields of an LLM reply; every field is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmParse {
    pub product: Option<String>,
    pub data_type: Option<String>,
    pub location: Option<String>,
    pub bbox: Option<Vec<f64>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cloud_cover_max: Option<f64>,
    pub provider: Option<String>,
}

impl LlmParse {
    /// Decode the first JSON object found in `reply`
    ///
    /// Models often wrap the object in prose or a code fence, and write
    /// numbers as strings or "null" as text, so values are read leniently.
    pub fn from_reply(reply: &str) -> Result<Self> {
        let text = strip_code_blocks(reply);
        let json = extract_json_object(text).ok_or_else(|| GeodatahubError::ParseError {
            reason: "LLM reply contains no JSON object".to_string(),
        })?;

        let object: Map<String, Value> = serde_json::from_str(json).map_err(|e| GeodatahubError::ParseError {
            reason: format!("LLM reply is not valid JSON: {}", e),
        })?;

        Ok(Self {
            product: string_field(&object, "product"),
            data_type: string_field(&object, "data_type"),
            location: string_field(&object, "location"),
            bbox: object.get("bbox").and_then(number_list),
            start_date: string_field(&object, "start_date"),
            end_date: string_field(&object, "end_date"),
            cloud_cover_max: object.get("cloud_cover_max").and_then(number),
            provider: string_field(&object, "provider"),
        })
    }

    /// Normalize into extracted fields, dropping values that do not make sense
    pub fn into_fields(self) -> ExtractedFields {
        let product = self.product.as_deref().map(canonical_product);
        let data_type = self
            .data_type
            .as_deref()
            .and_then(|t| t.parse::<DataType>().ok())
            .or_else(|| product.as_deref().and_then(DataType::infer_from_product));

        let bbox = self
            .bbox
            .as_deref()
            .and_then(|values| BoundingBox::from_slice(values).ok())
            .filter(|bbox| bbox.validate().is_ok());

        let mut start_date = self.start_date.as_deref().and_then(parse_date);
        let mut end_date = self.end_date.as_deref().and_then(parse_date);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                start_date = Some(end);
                end_date = Some(start);
            }
        }

        ExtractedFields {
            product,
            data_type,
            location: self.location,
            bbox,
            start_date,
            end_date,
            cloud_cover_max: self.cloud_cover_max.filter(|c| (0.0..=100.0).contains(c)),
            provider: self.provider,
        }
    }
}

/// Map an alias ("Sentinel 2") to its code; codes pass through upper-cased
fn canonical_product(value: &str) -> String {
    match extract_product(value) {
        Some((code, _)) if !looks_like_code(value) => code.to_string(),
        _ => value.trim().to_uppercase(),
    }
}

fn looks_like_code(value: &str) -> bool {
    value.contains('_') && !value.contains(char::is_whitespace)
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn number_list(value: &Value) -> Option<Vec<f64>> {
    value.as_array()?.iter().map(number).collect()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.get(..10).unwrap_or(value), "%Y-%m-%d").ok()
}
