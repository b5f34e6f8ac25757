use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vayu::api;
use vayu::config::VayuConfig;
use vayu::engine::AggregationEngine;
use vayu::geocode::{GeocodingGateway, NominatimClient};
use vayu::index::StationIndex;
use vayu::predict::{FallbackPredictor, PredictionClient};
use vayu::service::SearchService;
use vayu::{dataset, VERSION};

fn init_tracing(config: &VayuConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = VayuConfig::load().context("Failed to load configuration")?;
    init_tracing(&config);
    info!("Starting vayu v{VERSION}");

    let loaded = dataset::load(&config.dataset.path)
        .with_context(|| format!("Failed to load dataset from {}", config.dataset.path))?;
    let index = Arc::new(StationIndex::build(loaded.readings, loaded.dropped));
    info!(
        "Station index ready: {} readings, {} rows dropped",
        index.readings().len(),
        index.dropped_rows()
    );

    let geocoder = NominatimClient::new(&config.geocoding)
        .context("Failed to build geocoding client")?;
    let gateway = Arc::new(GeocodingGateway::new(Arc::new(geocoder)));

    let prediction = PredictionClient::new(&config.prediction)
        .context("Failed to build prediction client")?;
    let predictor = FallbackPredictor::new(gateway.clone(), Arc::new(prediction));

    let engine = AggregationEngine::new(index, gateway);
    let service = Arc::new(SearchService::new(engine, predictor));

    let app = api::app(service, &config.server.static_dir);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!("Listening on http://{}", config.server.bind_address);
    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
