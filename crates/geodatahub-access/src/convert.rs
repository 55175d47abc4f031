//! Normalization of provider items into search results

use geodatahub_core::models::{BoundingBox, DataType, SearchResult};
use geodatahub_core::ports::{Asset, ProviderItem};
use geodatahub_geo::footprint_bounds;
use serde_json::{Map, Value};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Asset keys holding a preview image, in order of preference
const PREVIEW_ASSETS: [&str; 2] = ["thumbnail", "rendered_preview"];

/// Asset keys holding the main file, in order of preference
const PRIMARY_ASSETS: [&str; 2] = ["data", "visual"];

/// Convert a provider item, taking the data type from the request when known
pub fn to_search_result(item: ProviderItem, data_type: Option<DataType>) -> SearchResult {
    let props = &item.properties;

    let title = string_prop(props, &["title"]).unwrap_or_else(|| item.id.clone());
    let datetime = string_prop(props, &["datetime", "start_datetime", "startTimeFromAscendingNode"])
        .unwrap_or_default();
    let cloud_cover = number_prop(props, &["eo:cloud_cover", "cloudCover"]);

    let thumbnail_url = PREVIEW_ASSETS
        .iter()
        .find_map(|key| item.assets.get(*key))
        .map(|asset| asset.href.clone())
        .or_else(|| string_prop(props, &["quicklook"]));

    let size_mb = asset_size_mb(&item).or_else(|| number_prop(props, &["size"]));

    let bbox = item
        .bbox
        .as_deref()
        .and_then(|values| BoundingBox::from_slice(values).ok())
        .or_else(|| item.geometry.as_ref().and_then(footprint_bounds));

    let data_type = data_type
        .or_else(|| DataType::infer_from_product(&item.product_type))
        .unwrap_or(DataType::Optical);

    let download_url = primary_asset(&item).map(|(_, asset)| asset.href.clone());

    SearchResult {
        title,
        provider: item.provider.clone(),
        product_type: item.product_type.clone(),
        data_type,
        datetime,
        cloud_cover,
        bbox,
        geometry: item.geometry.clone(),
        thumbnail_url,
        download_url,
        size_mb,
        metadata: item.properties.clone(),
        id: item.id,
    }
}

/// The asset a download fetches: `data`, then `visual`, then the first
/// asset that is not a preview
pub fn primary_asset(item: &ProviderItem) -> Option<(&str, &Asset)> {
    PRIMARY_ASSETS
        .iter()
        .find_map(|key| item.assets.get_key_value(*key))
        .or_else(|| item.assets.iter().find(|(key, asset)| !is_preview(key, asset)))
        .map(|(key, asset)| (key.as_str(), asset))
}

fn is_preview(key: &str, asset: &Asset) -> bool {
    PREVIEW_ASSETS.contains(&key)
        || asset
            .roles
            .iter()
            .any(|role| role == "thumbnail" || role == "overview" || role == "metadata")
}

fn asset_size_mb(item: &ProviderItem) -> Option<f64> {
    let sizes: Vec<u64> = item.assets.values().filter_map(|asset| asset.file_size).collect();
    if sizes.is_empty() {
        return None;
    }
    Some(sizes.iter().sum::<u64>() as f64 / BYTES_PER_MB)
}

fn string_prop(props: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| props.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number_prop(props: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| props.get(*key).and_then(Value::as_f64))
}

/// File name stem for an item id, safe on every platform
pub fn file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "item".to_string()
    } else {
        stem
    }
}

/// File extension for a download, from the URL path or the media type
pub fn file_extension(href: &str, media_type: Option<&str>) -> String {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let name = path.rsplit('/').next().unwrap_or(path);

    if let Some((_, ext)) = name.rsplit_once('.') {
        if !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return ext.to_lowercase();
        }
    }

    let media_type = media_type.unwrap_or_default();
    let ext = if media_type.starts_with("image/tiff") {
        "tif"
    } else if media_type.starts_with("image/jp2") {
        "jp2"
    } else if media_type.starts_with("image/png") {
        "png"
    } else if media_type.starts_with("image/jpeg") {
        "jpg"
    } else if media_type.contains("netcdf") {
        "nc"
    } else if media_type.contains("zip") {
        "zip"
    } else if media_type.contains("json") {
        "json"
    } else {
        "bin"
    };
    ext.to_string()
}
