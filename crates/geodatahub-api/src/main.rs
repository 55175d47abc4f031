use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use geodatahub_access::{DataHub, StacGateway};
use geodatahub_core::config::{LayeredConfig, LlmCredentials};
use geodatahub_geo::NominatimGeocoder;
use geodatahub_llm::select_backend;
use geodatahub_nlp::NlParser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geodatahub_api::{create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geodatahub_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = LayeredConfig::load(None).context("Failed to load configuration")?;
    let credentials = LlmCredentials::from_env();
    let api_config = ApiConfig::from_layered(&config);

    let backend = select_backend(&config, &credentials, config.llm_backend.value)
        .await
        .context("Failed to initialize LLM backend")?;
    let geocoder = Arc::new(NominatimGeocoder::new(config.geocoder_url.value.clone())?);
    let parser = Arc::new(NlParser::new(backend, geocoder));

    let gateway = StacGateway::from_config(&config).context("Failed to load providers")?;
    tracing::info!(
        port = api_config.port,
        llm_backend = parser.backend_name().unwrap_or("regex"),
        providers = ?gateway.providers().by_priority().iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        "Starting GeoDataHub API server"
    );
    let hub = DataHub::new(Arc::new(gateway));

    let cors = cors_layer(api_config.cors_origin.as_deref())?;
    let addr = api_config.bind_address();
    let state = Arc::new(AppState::new(parser, hub, api_config));
    let app = create_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let allow_origin = match origin {
        Some(origin) => {
            tracing::info!("CORS enabled for {}", origin);
            AllowOrigin::exact(origin.parse::<HeaderValue>().context("Invalid CORS origin")?)
        }
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
