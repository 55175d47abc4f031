use geodatahub_core::catalog::{self, ProductInfo};
use geodatahub_core::models::{DataRequest, DownloadOutcome, SearchResult};
use serde::Serialize;
use tabled::Tabled;

/// Output for search command
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: Option<String>,
    pub request: DataRequest,
    pub count: usize,
    pub results: Vec<SearchResult>,
    pub saved_to: Option<String>,
}

/// One search result as a table row
#[derive(Debug, Serialize, Tabled)]
pub struct ResultRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Provider")]
    pub provider: String,
    #[tabled(rename = "Cloud")]
    pub cloud: String,
    #[tabled(rename = "Size")]
    pub size: String,
}

impl ResultRow {
    pub fn new(index: usize, result: &SearchResult) -> Self {
        Self {
            index,
            id: result.id.clone(),
            date: result.date().to_string(),
            provider: result.provider.clone(),
            cloud: result
                .cloud_cover
                .map(|c| format!("{:.1}%", c))
                .unwrap_or_else(|| "-".to_string()),
            size: result
                .size_mb
                .map(|s| format!("{:.1} MB", s))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Output for download command
#[derive(Debug, Serialize)]
pub struct DownloadOutput {
    pub output_dir: String,
    pub requested: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub outcomes: Vec<DownloadOutcome>,
}

/// Row for `list providers`
#[derive(Debug, Serialize, Tabled)]
pub struct ProviderRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "URL")]
    pub url: String,
}

impl ProviderRow {
    pub fn new(id: String) -> Self {
        let info = catalog::find_provider(&id);
        Self {
            name: info.map(|p| p.name).unwrap_or("-").to_string(),
            url: info.map(|p| p.url).unwrap_or("-").to_string(),
            id,
        }
    }
}

/// Row for `list products`
#[derive(Debug, Serialize, Tabled)]
pub struct ProductRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Type")]
    pub data_type: String,
    #[tabled(rename = "Providers")]
    pub providers: String,
}

impl From<&ProductInfo> for ProductRow {
    fn from(info: &ProductInfo) -> Self {
        Self {
            id: info.id.clone(),
            title: info.title.clone(),
            data_type: info.data_type.as_str().to_string(),
            providers: info.providers.join(", "),
        }
    }
}

/// Row for `config`
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
