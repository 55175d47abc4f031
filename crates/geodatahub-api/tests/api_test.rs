//! HTTP surface over an in-memory provider and the rule-based parser

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use geodatahub_access::{DataHub, MemoryGateway};
use geodatahub_api::{create_router, ApiConfig, AppState};
use geodatahub_core::models::BoundingBox;
use geodatahub_core::ports::ProviderItem;
use geodatahub_geo::StaticGeocoder;
use geodatahub_nlp::NlParser;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const PARIS_QUERY: &str = "Sentinel-2 images of Paris from January 2024 with less than 20% cloud cover";

fn scene(id: &str, date: &str, cloud: f64) -> ProviderItem {
    serde_json::from_value(json!({
        "id": id,
        "provider": "earth_search",
        "product_type": "S2_MSI_L2A",
        "bbox": [2.0, 48.5, 2.6, 49.0],
        "properties": {"datetime": format!("{}T10:30:00Z", date), "eo:cloud_cover": cloud},
        "assets": {"visual": {"href": format!("https://example.com/{}.tif", id)}}
    }))
    .unwrap()
}

fn app() -> Router {
    let gateway = Arc::new(MemoryGateway::with_items([
        scene("a", "2024-01-05", 3.0),
        scene("b", "2024-01-09", 45.0),
        scene("c", "2024-01-14", 11.0),
        scene("d", "2024-01-28", 0.5),
    ]));
    let geocoder = StaticGeocoder::new().with_place("Paris", BoundingBox::new(2.22, 48.81, 2.47, 48.90));
    let parser = Arc::new(NlParser::regex_only(Arc::new(geocoder)));

    create_router(Arc::new(AppState::new(parser, DataHub::new(gateway), ApiConfig::default())))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(uri: &str) -> (StatusCode, Value) {
    send(Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(request).await
}

fn ids(body: &Value) -> Vec<&str> {
    body["results"].as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect()
}

#[tokio::test]
async fn test_root_and_health() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "GeoDataHub API");
    assert_eq!(body["endpoints"]["search"], "/search");

    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "geodatahub-api");
    assert_eq!(body["llm_backend"], Value::Null);
}

#[tokio::test]
async fn test_search_with_query() {
    let (status, body) = post("/search", json!({"query": PARIS_QUERY})).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["query"], PARIS_QUERY);
    assert_eq!(body["count"], 3);
    assert_eq!(ids(&body), vec!["a", "c", "d"]);

    let parsed = &body["parsed_request"];
    assert_eq!(parsed["product"], "S2_MSI_L2A");
    assert_eq!(parsed["location"], "Paris");
    assert_eq!(parsed["bbox"], json!([2.22, 48.81, 2.47, 48.90]));
    assert_eq!(parsed["start_date"], "2024-01-01");
    assert_eq!(parsed["end_date"], "2024-01-31");
    assert_eq!(parsed["cloud_cover_max"], json!(20.0));
}

#[tokio::test]
async fn test_explicit_fields_override_query() {
    let body = json!({"query": PARIS_QUERY, "start_date": "2024-01-10", "limit": 1});
    let (status, body) = post("/search", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parsed_request"]["start_date"], "2024-01-10");
    assert_eq!(body["parsed_request"]["limit"], 1);
    assert_eq!(ids(&body), vec!["c"]);
}

#[tokio::test]
async fn test_search_with_explicit_fields_only() {
    let body = json!({
        "bbox": [2.22, 48.81, 2.47, 48.90],
        "start_date": "2024-01-20",
        "end_date": "2024-01-31"
    });
    let (status, body) = post("/search", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], Value::Null);
    assert_eq!(ids(&body), vec!["d"]);
}

#[tokio::test]
async fn test_search_nl() {
    let (status, body) = get("/search/nl?q=Sentinel-2%20of%20Paris%20in%20January%202024&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["a", "b"]);
}

#[tokio::test]
async fn test_limit_out_of_range() {
    let (status, body) = post("/search", json!({"query": PARIS_QUERY, "limit": 0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid limit");

    let (status, _) = get("/search/nl?q=Sentinel-2&limit=101").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unparseable_query() {
    let (status, body) = post("/search", json!({"query": "show me something nice"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].as_str().unwrap().contains("show me something nice"));
}

#[tokio::test]
async fn test_invalid_bbox() {
    let (status, _) = post("/search", json!({"product": "S2_MSI_L2A", "bbox": [1.0, 2.0]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_products() {
    let (status, body) = get("/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["products"][0]["id"], "S2_MSI_L2A");

    let (status, body) = get("/products/s2_msi_l2a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["providers"], json!(["earth_search"]));

    let (status, body) = get("/products/ERA5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product ERA5 not found");
}

#[tokio::test]
async fn test_providers_and_data_types() {
    let (status, body) = get("/providers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["providers"][0]["id"], "earth_search");

    let (status, body) = get("/data-types").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data_types"].as_array().unwrap().contains(&json!("dem")));
}

#[tokio::test]
async fn test_recommend() {
    let body = json!({"analysis_description": "flood extent mapping with radar", "limit": 2});
    let (status, body) = post("/datasources/recommend", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"][0]["product"]["id"], "S1_SAR_GRD");
    assert!(body["count"].as_u64().unwrap() <= 2);

    let (status, _) = post("/datasources/recommend", json!({"analysis_description": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_datasources_listing() {
    let (status, body) = get("/datasources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 10);
    assert_eq!(body["filter"], json!({"category": null, "keyword": null}));

    let (status, body) = get("/datasources?category=SAR").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["datasources"][0]["id"], "S1_SAR_GRD");

    let (status, body) = get("/datasources?category=dem&keyword=90").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["datasources"][0]["id"], "COP-DEM_GLO-90");

    let (status, body) = get("/datasources?keyword=Elevation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, body) = get("/datasources?category=lidar").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].as_str().unwrap().contains("lidar"));
}

#[tokio::test]
async fn test_datasource_by_id() {
    let (status, body) = get("/datasources/era5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "ERA5");
    assert_eq!(body["data_type"], "climate");

    let (status, body) = get("/datasources/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Data source NOPE not found");
}

#[tokio::test]
async fn test_datasource_categories() {
    let (status, body) = get("/datasources/categories/list").await;
    assert_eq!(status, StatusCode::OK);

    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 7);
    let land_cover = categories.iter().find(|c| c["id"] == "land_cover").unwrap();
    assert_eq!(land_cover["name"], "Land Cover");
    assert_eq!(land_cover["count"], 1);
    let total: u64 = categories.iter().map(|c| c["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 10);
}
