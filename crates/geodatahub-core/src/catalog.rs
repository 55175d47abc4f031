//! Static product and provider catalog with keyword recommendations

use serde::{Deserialize, Serialize};

use crate::models::DataType;

/// Static description of a product
#[derive(Debug, Clone, Copy)]
pub struct ProductEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub data_type: DataType,
    pub resolution_m: Option<f64>,
    pub keywords: &'static [&'static str],
    pub use_cases: &'static [&'static str],
    pub providers: &'static [&'static str],
}

/// Product description as served to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub data_type: DataType,
    pub resolution_m: Option<f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub providers: Vec<String>,
}

impl ProductInfo {
    /// Minimal description for a product code the catalog does not know
    pub fn unlisted(id: &str, provider: &str) -> Self {
        let data_type = DataType::infer_from_product(id).unwrap_or(DataType::Optical);
        Self {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            data_type,
            resolution_m: None,
            keywords: Vec::new(),
            use_cases: Vec::new(),
            providers: vec![provider.to_string()],
        }
    }
}

impl From<&ProductEntry> for ProductInfo {
    fn from(entry: &ProductEntry) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            id: entry.id.to_string(),
            title: entry.title.to_string(),
            description: entry.description.to_string(),
            data_type: entry.data_type,
            resolution_m: entry.resolution_m,
            keywords: owned(entry.keywords),
            use_cases: owned(entry.use_cases),
            providers: owned(entry.providers),
        }
    }
}

/// Static description of a data provider
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub requires_auth: bool,

    /// Higher is preferred
    pub priority: u8,
}

pub static PRODUCTS: &[ProductEntry] = &[
    ProductEntry {
        id: "S2_MSI_L2A",
        title: "Sentinel-2 MSI Level-2A",
        description: "Bottom-of-atmosphere multispectral reflectance with atmospheric correction",
        data_type: DataType::Optical,
        resolution_m: Some(10.0),
        keywords: &[
            "vegetation", "agriculture", "crop", "forest", "urban", "water", "ndvi",
            "multispectral", "optical", "sentinel",
        ],
        use_cases: &[
            "Vegetation monitoring",
            "Crop health assessment",
            "Water quality",
            "Urban mapping",
            "Change detection",
        ],
        providers: &["earth_search", "planetary_computer", "cop_dataspace"],
    },
    ProductEntry {
        id: "S2_MSI_L1C",
        title: "Sentinel-2 MSI Level-1C",
        description: "Top-of-atmosphere reflectance in cartographic geometry",
        data_type: DataType::Optical,
        resolution_m: Some(10.0),
        keywords: &["toa", "top of atmosphere", "raw", "sentinel"],
        use_cases: &["Custom atmospheric correction", "Cloud detection research"],
        providers: &["earth_search", "cop_dataspace"],
    },
    ProductEntry {
        id: "S1_SAR_GRD",
        title: "Sentinel-1 SAR GRD",
        description: "Ground Range Detected C-band radar backscatter, usable through clouds",
        data_type: DataType::Sar,
        resolution_m: Some(10.0),
        keywords: &["sar", "radar", "flood", "ship", "oil spill", "all-weather"],
        use_cases: &["Flood mapping", "Ship detection", "Soil moisture", "Deforestation monitoring"],
        providers: &["earth_search", "planetary_computer", "cop_dataspace"],
    },
    ProductEntry {
        id: "LANDSAT_C2L2",
        title: "Landsat Collection 2 Level-2",
        description: "Surface reflectance and surface temperature from Landsat 8/9",
        data_type: DataType::Optical,
        resolution_m: Some(30.0),
        keywords: &["landsat", "thermal", "temperature", "historical", "long-term"],
        use_cases: &[
            "Long-term monitoring",
            "Temperature mapping",
            "Urban heat island",
            "Fire detection",
        ],
        providers: &["earth_search", "planetary_computer", "usgs"],
    },
    ProductEntry {
        id: "MODIS_MOD09GA",
        title: "MODIS Daily Surface Reflectance",
        description: "Terra MODIS daily global surface reflectance",
        data_type: DataType::Optical,
        resolution_m: Some(500.0),
        keywords: &["modis", "daily", "global"],
        use_cases: &["Global vegetation dynamics", "Daily monitoring"],
        providers: &["planetary_computer"],
    },
    ProductEntry {
        id: "COP-DEM_GLO-30",
        title: "Copernicus DEM 30m",
        description: "Global 30 m digital elevation model",
        data_type: DataType::Dem,
        resolution_m: Some(30.0),
        keywords: &["dem", "elevation", "terrain", "slope", "topography"],
        use_cases: &["Terrain analysis", "Watershed delineation", "Slope mapping"],
        providers: &["earth_search", "planetary_computer"],
    },
    ProductEntry {
        id: "COP-DEM_GLO-90",
        title: "Copernicus DEM 90m",
        description: "Global 90 m digital elevation model",
        data_type: DataType::Dem,
        resolution_m: Some(90.0),
        keywords: &["dem", "elevation", "terrain"],
        use_cases: &["Regional terrain analysis", "Hydrological modeling"],
        providers: &["earth_search", "planetary_computer"],
    },
    ProductEntry {
        id: "ESA_WORLDCOVER",
        title: "ESA WorldCover",
        description: "10 m global land cover map",
        data_type: DataType::LandCover,
        resolution_m: Some(10.0),
        keywords: &["land cover", "landcover", "classification", "lulc"],
        use_cases: &["Land use planning", "Habitat mapping", "Land cover classification"],
        providers: &["planetary_computer"],
    },
    ProductEntry {
        id: "ERA5",
        title: "ERA5 Reanalysis",
        description: "ECMWF hourly global climate reanalysis",
        data_type: DataType::Climate,
        resolution_m: Some(31000.0),
        keywords: &["climate", "precipitation", "wind", "reanalysis", "weather"],
        use_cases: &["Climate trend analysis", "Drought assessment", "Weather context"],
        providers: &["cop_cds"],
    },
    ProductEntry {
        id: "S5P_L2_NO2",
        title: "Sentinel-5P NO2",
        description: "Tropospheric nitrogen dioxide column from TROPOMI",
        data_type: DataType::AirQuality,
        resolution_m: Some(7000.0),
        keywords: &["air quality", "no2", "pollution", "atmosphere", "emissions"],
        use_cases: &["Air pollution monitoring", "Emission tracking"],
        providers: &["cop_dataspace"],
    },
];

pub static PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        id: "cop_dataspace",
        name: "Copernicus Data Space",
        description: "ESA platform for Copernicus Sentinel data",
        url: "https://dataspace.copernicus.eu/",
        requires_auth: true,
        priority: 10,
    },
    ProviderInfo {
        id: "planetary_computer",
        name: "Microsoft Planetary Computer",
        description: "STAC catalog with many free datasets",
        url: "https://planetarycomputer.microsoft.com/api/stac/v1",
        requires_auth: false,
        priority: 9,
    },
    ProviderInfo {
        id: "earth_search",
        name: "Earth Search (AWS)",
        description: "Element84 STAC API for Sentinel and Landsat on AWS",
        url: "https://earth-search.aws.element84.com/v1",
        requires_auth: false,
        priority: 8,
    },
    ProviderInfo {
        id: "usgs",
        name: "USGS Earth Explorer",
        description: "US Geological Survey archive",
        url: "https://earthexplorer.usgs.gov/",
        requires_auth: true,
        priority: 8,
    },
    ProviderInfo {
        id: "cop_cds",
        name: "Copernicus Climate Data Store",
        description: "Climate reanalysis data",
        url: "https://cds.climate.copernicus.eu/",
        requires_auth: true,
        priority: 7,
    },
];

/// Look up a product by code, case-insensitively
pub fn find_product(id: &str) -> Option<&'static ProductEntry> {
    PRODUCTS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

pub fn find_provider(id: &str) -> Option<&'static ProviderInfo> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Products offered by a provider
pub fn products_for(provider: &str) -> Vec<&'static ProductEntry> {
    PRODUCTS.iter().filter(|p| p.providers.contains(&provider)).collect()
}

/// Products of one data type, in catalog order
pub fn products_of_type(data_type: DataType) -> Vec<&'static ProductEntry> {
    PRODUCTS.iter().filter(|p| p.data_type == data_type).collect()
}

/// Products whose code, title, description or keywords mention `keyword`
pub fn products_matching(keyword: &str) -> Vec<&'static ProductEntry> {
    let keyword = keyword.trim().to_lowercase();
    PRODUCTS
        .iter()
        .filter(|p| {
            [p.id, p.title, p.description]
                .iter()
                .chain(p.keywords)
                .any(|field| field.to_lowercase().contains(&keyword))
        })
        .collect()
}

/// A product matched against a free-text analysis description
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub product: ProductInfo,
    pub score: u32,

    /// Use cases that matched the description
    pub reasons: Vec<String>,
}

/// Rank products for a description of the intended analysis
///
/// Each keyword found in the text scores 2; each use case sharing a word of
/// four or more letters with the text scores 1. Products without any hit are
/// dropped. Ties keep catalog order.
pub fn recommend(text: &str, n: usize) -> Vec<Recommendation> {
    let text = text.to_lowercase();

    let mut ranked: Vec<Recommendation> = PRODUCTS
        .iter()
        .filter_map(|product| {
            let keyword_hits = product.keywords.iter().filter(|k| text.contains(*k)).count();

            let reasons: Vec<String> = product
                .use_cases
                .iter()
                .filter(|use_case| {
                    use_case
                        .to_lowercase()
                        .split_whitespace()
                        .any(|word| word.len() >= 4 && text.contains(word))
                })
                .map(|use_case| use_case.to_string())
                .collect();

            let score = (keyword_hits * 2 + reasons.len()) as u32;
            (score > 0).then(|| Recommendation {
                product: ProductInfo::from(product),
                score,
                reasons,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(n);
    ranked
}
