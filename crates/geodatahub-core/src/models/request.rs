use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::BoundingBox;
use crate::error::{GeodatahubError, Result};

/// Product searched when a request names none
pub const DEFAULT_PRODUCT: &str = "S2_MSI_L2A";

/// Result limit used when the caller gives none
pub const DEFAULT_LIMIT: usize = 10;

/// Kind of geospatial data a product carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Optical,
    Sar,
    Dem,
    LandCover,
    Climate,
    Population,
    AirQuality,
}

impl DataType {
    pub const ALL: [DataType; 7] = [
        DataType::Optical,
        DataType::Sar,
        DataType::Dem,
        DataType::LandCover,
        DataType::Climate,
        DataType::Population,
        DataType::AirQuality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Optical => "optical",
            DataType::Sar => "sar",
            DataType::Dem => "dem",
            DataType::LandCover => "land_cover",
            DataType::Climate => "climate",
            DataType::Population => "population",
            DataType::AirQuality => "air_quality",
        }
    }

    /// Guess the data type from a canonical product code
    pub fn infer_from_product(product: &str) -> Option<DataType> {
        let code = product.to_uppercase();
        if code.starts_with("S2") || code.contains("LANDSAT") || code.contains("MODIS") {
            Some(DataType::Optical)
        } else if code.starts_with("S1") || code.contains("SAR") {
            Some(DataType::Sar)
        } else if code.contains("DEM") || code.contains("SRTM") {
            Some(DataType::Dem)
        } else if code.contains("WORLDCOVER") || code.contains("CORINE") {
            Some(DataType::LandCover)
        } else if code.contains("ERA5") {
            Some(DataType::Climate)
        } else if code.starts_with("S5P") {
            Some(DataType::AirQuality)
        } else {
            None
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = GeodatahubError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "optical" => Ok(DataType::Optical),
            "sar" | "radar" => Ok(DataType::Sar),
            "dem" | "elevation" => Ok(DataType::Dem),
            "land_cover" | "landcover" | "lulc" => Ok(DataType::LandCover),
            "climate" => Ok(DataType::Climate),
            "population" => Ok(DataType::Population),
            "air_quality" | "airquality" => Ok(DataType::AirQuality),
            _ => Err(GeodatahubError::invalid(
                "data_type",
                format!(
                    "unknown data type '{}'. Use one of: {}",
                    s,
                    DataType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
                ),
            )),
        }
    }
}

/// Structured search request consumed by the data-access facade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRequest {
    /// Canonical product code (e.g. S2_MSI_L2A)
    pub product: Option<String>,

    pub data_type: Option<DataType>,

    /// Preferred provider
    pub provider: Option<String>,

    /// Area of interest; wins over `location_name` when both are set
    pub bbox: Option<BoundingBox>,

    /// Place name, geocoded into `bbox` when possible
    pub location_name: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Maximum cloud cover percentage (0-100)
    pub cloud_cover_max: Option<f64>,

    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for DataRequest {
    fn default() -> Self {
        Self {
            product: None,
            data_type: None,
            provider: None,
            bbox: None,
            location_name: None,
            start_date: None,
            end_date: None,
            cloud_cover_max: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl DataRequest {
    /// Product to search, falling back to Sentinel-2 L2A
    pub fn effective_product(&self) -> &str {
        self.product.as_deref().unwrap_or(DEFAULT_PRODUCT)
    }

    /// Whether the request names a product or a time window
    pub fn has_search_signal(&self) -> bool {
        self.product.is_some() || self.start_date.is_some() || self.end_date.is_some()
    }

    /// Overwrite every field the overrides set
    pub fn apply(&mut self, overrides: &RequestOverrides) {
        if let Some(ref product) = overrides.product {
            self.product = Some(product.clone());
        }
        if let Some(data_type) = overrides.data_type {
            self.data_type = Some(data_type);
        }
        if let Some(ref provider) = overrides.provider {
            self.provider = Some(provider.clone());
        }
        if let Some(bbox) = overrides.bbox {
            self.bbox = Some(bbox);
        }
        if let Some(ref location) = overrides.location_name {
            self.location_name = Some(location.clone());
        }
        if let Some(start) = overrides.start_date {
            self.start_date = Some(start);
        }
        if let Some(end) = overrides.end_date {
            self.end_date = Some(end);
        }
        if let Some(cloud) = overrides.cloud_cover_max {
            self.cloud_cover_max = Some(cloud);
        }
        if let Some(limit) = overrides.limit {
            self.limit = limit;
        }
    }

    /// Check field ranges and ordering
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(GeodatahubError::invalid("limit", "must be a positive integer"));
        }

        if let Some(cloud) = self.cloud_cover_max {
            if !(0.0..=100.0).contains(&cloud) {
                return Err(GeodatahubError::invalid(
                    "cloud_cover_max",
                    format!("{} is outside 0-100", cloud),
                ));
            }
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(GeodatahubError::invalid(
                    "start_date",
                    format!("start {} is after end {}", start, end),
                ));
            }
        }

        if let Some(ref bbox) = self.bbox {
            bbox.validate()?;
        }

        Ok(())
    }
}

impl fmt::Display for DataRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref product) = self.product {
            parts.push(format!("product={}", product));
        }
        if let Some(data_type) = self.data_type {
            parts.push(format!("type={}", data_type));
        }
        if let Some(ref location) = self.location_name {
            parts.push(format!("location={}", location));
        }
        if let Some(ref bbox) = self.bbox {
            parts.push(format!("bbox={}", bbox));
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => parts.push(format!("dates={} to {}", start, end)),
            (Some(start), None) => parts.push(format!("from={}", start)),
            (None, Some(end)) => parts.push(format!("until={}", end)),
            (None, None) => {}
        }
        if let Some(cloud) = self.cloud_cover_max {
            parts.push(format!("clouds<{}%", cloud));
        }
        if let Some(ref provider) = self.provider {
            parts.push(format!("provider={}", provider));
        }
        parts.push(format!("limit={}", self.limit));

        write!(f, "DataRequest({})", parts.join(", "))
    }
}

/// Caller-supplied request fields; every `Some` wins over extracted values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOverrides {
    pub product: Option<String>,
    pub data_type: Option<DataType>,
    pub provider: Option<String>,
    pub bbox: Option<BoundingBox>,
    pub location_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub cloud_cover_max: Option<f64>,
    pub limit: Option<usize>,
}

impl RequestOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a request from these fields alone
    pub fn to_request(&self) -> DataRequest {
        let mut request = DataRequest::default();
        request.apply(self);
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_data_type_round_trip() {
        for data_type in DataType::ALL {
            let parsed: DataType = data_type.as_str().parse().unwrap();
            assert_eq!(parsed, data_type);
            let json = serde_json::to_string(&data_type).unwrap();
            assert_eq!(json, format!("\"{}\"", data_type.as_str()));
        }
        assert_eq!("Land Cover".parse::<DataType>().unwrap(), DataType::LandCover);
        assert!("hyperspectral".parse::<DataType>().is_err());
    }

    #[test]
    fn test_infer_from_product() {
        assert_eq!(DataType::infer_from_product("S2_MSI_L2A"), Some(DataType::Optical));
        assert_eq!(DataType::infer_from_product("LANDSAT_C2L2"), Some(DataType::Optical));
        assert_eq!(DataType::infer_from_product("S1_SAR_GRD"), Some(DataType::Sar));
        assert_eq!(DataType::infer_from_product("COP-DEM_GLO-30"), Some(DataType::Dem));
        assert_eq!(DataType::infer_from_product("ESA_WORLDCOVER"), Some(DataType::LandCover));
        assert_eq!(DataType::infer_from_product("S5P_L2"), Some(DataType::AirQuality));
        assert_eq!(DataType::infer_from_product("UNKNOWN"), None);
    }

    #[test]
    fn test_default_request() {
        let request = DataRequest::default();
        assert_eq!(request.limit, DEFAULT_LIMIT);
        assert_eq!(request.effective_product(), DEFAULT_PRODUCT);
        assert!(!request.has_search_signal());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut request = DataRequest { cloud_cover_max: Some(120.0), ..Default::default() };
        assert!(request.validate().is_err());

        request.cloud_cover_max = Some(20.0);
        request.start_date = Some(date(2024, 2, 1));
        request.end_date = Some(date(2024, 1, 1));
        assert!(request.validate().is_err());

        request.end_date = Some(date(2024, 2, 1));
        assert!(request.validate().is_ok());

        request.limit = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_apply_overrides_only_set_fields() {
        let mut request = DataRequest {
            product: Some("S2_MSI_L2A".to_string()),
            location_name: Some("Paris".to_string()),
            cloud_cover_max: Some(20.0),
            ..Default::default()
        };

        let overrides = RequestOverrides {
            product: Some("LANDSAT_C2L2".to_string()),
            limit: Some(3),
            ..Default::default()
        };
        request.apply(&overrides);

        assert_eq!(request.product.as_deref(), Some("LANDSAT_C2L2"));
        assert_eq!(request.location_name.as_deref(), Some("Paris"));
        assert_eq!(request.cloud_cover_max, Some(20.0));
        assert_eq!(request.limit, 3);
    }

    #[test]
    fn test_display() {
        let request = DataRequest {
            product: Some("S2_MSI_L2A".to_string()),
            data_type: Some(DataType::Optical),
            location_name: Some("Paris".to_string()),
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2024, 1, 31)),
            cloud_cover_max: Some(20.0),
            ..Default::default()
        };
        assert_eq!(
            request.to_string(),
            "DataRequest(product=S2_MSI_L2A, type=optical, location=Paris, \
             dates=2024-01-01 to 2024-01-31, clouds<20%, limit=10)"
        );
    }

    #[test]
    fn test_overrides_is_empty() {
        assert!(RequestOverrides::default().is_empty());
        let overrides = RequestOverrides { limit: Some(5), ..Default::default() };
        assert!(!overrides.is_empty());
        assert_eq!(overrides.to_request().limit, 5);
    }
}
