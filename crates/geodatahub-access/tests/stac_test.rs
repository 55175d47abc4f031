//! STAC gateway against local stand-in catalogs

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use geodatahub_access::{DataHub, ProvidersConfig, StacGateway, StacProvider};
use geodatahub_core::error::{GeodatahubError, ProviderOperation};
use geodatahub_core::models::{BoundingBox, DataRequest, DataType};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Catalog {
    base_url: Arc<Mutex<String>>,
    last_search: Arc<Mutex<Option<Value>>>,
}

async fn search(State(catalog): State<Catalog>, Json(body): Json<Value>) -> Json<Value> {
    let base_url = catalog.base_url.lock().unwrap().clone();
    *catalog.last_search.lock().unwrap() = Some(body);

    Json(json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "S2B_31UDQ_20240115_0_L2A",
                "bbox": [2.0, 48.6, 3.5, 49.6],
                "geometry": {"type": "Polygon", "coordinates": [[[2.0, 48.6], [3.5, 48.6], [3.5, 49.6], [2.0, 49.6], [2.0, 48.6]]]},
                "properties": {"datetime": "2024-01-15T10:56:21Z", "eo:cloud_cover": 4.2},
                "assets": {
                    "thumbnail": {"href": format!("{}/files/thumb.jpg", base_url), "roles": ["thumbnail"]},
                    "visual": {"href": format!("{}/files/TCI.tif", base_url), "type": "image/tiff", "file:size": 2097152}
                }
            },
            {
                "type": "Feature",
                "id": "S2A_31UDQ_20240120_0_L2A",
                "properties": {"datetime": "2024-01-20T10:56:21Z", "eo:cloud_cover": 9.0},
                "assets": {}
            }
        ]
    }))
}

async fn broken_search() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

async fn file(headers: HeaderMap) -> impl IntoResponse {
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("Bearer stac-token") {
        return (StatusCode::UNAUTHORIZED, Vec::new()).into_response();
    }
    ([(header::CONTENT_TYPE, "image/tiff")], vec![7u8; 4096]).into_response()
}

async fn spawn_catalog() -> (String, Catalog) {
    let catalog = Catalog::default();
    let app = Router::new()
        .route("/search", post(search))
        .route("/down/search", post(broken_search))
        .route("/files/TCI.tif", get(file))
        .with_state(catalog.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    *catalog.base_url.lock().unwrap() = base_url.clone();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base_url, catalog)
}

fn gateway(base_url: &str) -> StacGateway {
    let mut local = StacProvider::new("local", base_url, 5).with_collection("S2_MSI_L2A", "sentinel-2-l2a");
    local.api_key_env = Some("GEODATAHUB_TEST_STAC_TOKEN".to_string());
    let down = StacProvider::new("down", &format!("{}/down", base_url), 9).with_collection("S2_MSI_L2A", "s2");

    StacGateway::new(ProvidersConfig { providers: vec![local, down] }).unwrap()
}

fn request() -> DataRequest {
    DataRequest {
        product: Some("S2_MSI_L2A".to_string()),
        bbox: Some(BoundingBox::new(2.22, 48.81, 2.47, 48.90)),
        start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
        end_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 31),
        cloud_cover_max: Some(20.0),
        limit: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_search_falls_over_to_next_provider() {
    let (base_url, catalog) = spawn_catalog().await;
    let hub = DataHub::new(Arc::new(gateway(&base_url)));

    let results = hub.search(&request()).await.unwrap();
    assert_eq!(results.len(), 2);

    let first = &results[0];
    assert_eq!(first.provider, "local");
    assert_eq!(first.product_type, "S2_MSI_L2A");
    assert_eq!(first.data_type, DataType::Optical);
    assert_eq!(first.cloud_cover, Some(4.2));
    assert_eq!(first.size_mb, Some(2.0));
    assert_eq!(first.thumbnail_url, Some(format!("{}/files/thumb.jpg", base_url)));
    assert_eq!(results[1].bbox, None);

    let body = catalog.last_search.lock().unwrap().clone().unwrap();
    assert_eq!(body["collections"], json!(["sentinel-2-l2a"]));
    assert_eq!(body["datetime"], json!("2024-01-01T00:00:00Z/2024-01-31T23:59:59Z"));
    assert_eq!(body["query"]["eo:cloud_cover"]["lte"], json!(20.0));
    assert_eq!(body["limit"], json!(5));
}

#[tokio::test]
async fn test_hinted_provider_error_is_tagged() {
    let (base_url, _catalog) = spawn_catalog().await;
    let hub = DataHub::new(Arc::new(gateway(&base_url)));

    let request = DataRequest { provider: Some("down".to_string()), ..request() };
    let err = hub.search(&request).await.unwrap_err();
    assert!(matches!(
        err,
        GeodatahubError::Provider { operation: ProviderOperation::Search, ref provider, .. } if provider == "down"
    ));
}

#[tokio::test]
async fn test_download_streams_primary_asset() {
    let (base_url, _catalog) = spawn_catalog().await;
    let hub = DataHub::new(Arc::new(gateway(&base_url)));
    let results = hub.search(&request()).await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    // Without the token the catalog refuses the file
    std::env::remove_var("GEODATAHUB_TEST_STAC_TOKEN");
    let err = hub.download(&results[0], dir.path()).await.unwrap_err();
    assert!(matches!(err, GeodatahubError::Provider { operation: ProviderOperation::Download, .. }));

    std::env::set_var("GEODATAHUB_TEST_STAC_TOKEN", "stac-token");

    // A directory squatting on the target makes the final rename fail
    let blocked = tempfile::tempdir().unwrap();
    std::fs::create_dir(blocked.path().join("S2B_31UDQ_20240115_0_L2A.tif")).unwrap();
    let err = hub.download(&results[0], blocked.path()).await.unwrap_err();
    assert!(matches!(err, GeodatahubError::Provider { operation: ProviderOperation::Download, .. }));
    assert!(!blocked.path().join("S2B_31UDQ_20240115_0_L2A.part").exists());

    let path = hub.download(&results[0], dir.path()).await.unwrap();
    assert_eq!(path, dir.path().join("S2B_31UDQ_20240115_0_L2A.tif"));
    assert_eq!(std::fs::read(&path).unwrap().len(), 4096);
    assert!(!dir.path().join("S2B_31UDQ_20240115_0_L2A.part").exists());

    let outcomes = hub.download_all(&results, dir.path()).await;
    assert!(outcomes[0].is_success());
    assert!(!outcomes[1].is_success());
    std::env::remove_var("GEODATAHUB_TEST_STAC_TOKEN");
}
