use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

use super::{BoundingBox, DataType};
use crate::error::{GeodatahubError, Result};

/// Derived keys added by [`SearchResult::to_flat_map`]
const DERIVED_KEYS: [&str; 2] = ["date", "year"];

/// One normalized provider item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub provider: String,
    pub product_type: String,
    pub data_type: DataType,

    /// Acquisition datetime in ISO 8601
    pub datetime: String,

    pub cloud_cover: Option<f64>,
    pub bbox: Option<BoundingBox>,

    /// GeoJSON footprint
    pub geometry: Option<Value>,

    pub thumbnail_url: Option<String>,

    /// Primary asset to fetch on download
    pub download_url: Option<String>,

    pub size_mb: Option<f64>,

    /// Raw provider properties
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SearchResult {
    /// Acquisition date (`YYYY-MM-DD`), empty when unknown
    pub fn date(&self) -> &str {
        self.datetime.get(..10).unwrap_or(&self.datetime)
    }

    /// Acquisition year
    pub fn year(&self) -> Option<i32> {
        self.datetime.get(..4)?.parse().ok()
    }

    /// Flatten to a JSON object for export, including `date` and `year`
    pub fn to_flat_map(&self) -> Result<Map<String, Value>> {
        let mut map = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => {
                return Err(GeodatahubError::Serialization(format!(
                    "expected an object, got {}",
                    other
                )))
            }
        };
        map.insert("date".to_string(), Value::String(self.date().to_string()));
        map.insert("year".to_string(), self.year().map(Value::from).unwrap_or(Value::Null));
        Ok(map)
    }

    /// Re-read an exported object; derived keys are recomputed
    pub fn from_flat_map(map: &Map<String, Value>) -> Result<Self> {
        let mut fields = map.clone();
        for key in DERIVED_KEYS {
            fields.remove(key);
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = if self.datetime.is_empty() { "unknown" } else { self.date() };
        write!(
            f,
            "SearchResult(id={}, provider={}, type={}, date={}",
            self.id, self.provider, self.product_type, date
        )?;
        if let Some(cloud) = self.cloud_cover {
            write!(f, ", clouds={:.1}%", cloud)?;
        }
        write!(f, ")")
    }
}

/// Outcome of one item in a batch download
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadOutcome {
    pub result_id: String,
    #[serde(flatten)]
    pub status: DownloadStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadStatus {
    Downloaded { path: PathBuf },
    Failed { reason: String },
}

impl DownloadOutcome {
    pub fn downloaded(result_id: impl Into<String>, path: PathBuf) -> Self {
        Self {
            result_id: result_id.into(),
            status: DownloadStatus::Downloaded { path },
        }
    }

    pub fn failed(result_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            result_id: result_id.into(),
            status: DownloadStatus::Failed { reason: reason.into() },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, DownloadStatus::Downloaded { .. })
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match &self.status {
            DownloadStatus::Downloaded { path } => Some(path),
            DownloadStatus::Failed { .. } => None,
        }
    }
}
