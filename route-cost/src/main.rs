use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use route_cost::cache::{CacheConfig, ResultCache};
use route_cost::cost::{CostEngine, EngineConfig};
use route_cost::domain::CountryCode;
use route_cost::pricing::{InMemoryPriceSource, PricingTables};
use route_cost::route_provider::StraightLineProvider;
use route_cost::web::{AppState, DEFAULT_REQUEST_DEADLINE, create_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Read a millisecond duration from the environment.
fn env_millis(name: &str) -> Result<Option<Duration>, Box<dyn Error>> {
    match std::env::var(name) {
        Ok(value) => {
            let millis: u64 = value
                .trim()
                .parse()
                .map_err(|e| format!("{name}={value:?}: {e}"))?;
            Ok(Some(Duration::from_millis(millis)))
        }
        Err(_) => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Price store, optionally seeded from a JSON file
    let price_data = std::env::var("ROUTE_COST_PRICE_DATA").ok();
    let source = match &price_data {
        Some(path) => {
            let source = InMemoryPriceSource::from_file(path)?;
            let (fuel, segments) = source.counts().await;
            info!(path = %path, fuel, segments, "loaded price data");
            source
        }
        None => {
            warn!("ROUTE_COST_PRICE_DATA not set, all prices will be estimated");
            InMemoryPriceSource::new()
        }
    };

    let mut config = EngineConfig::default();
    if let Ok(code) = std::env::var("ROUTE_COST_FALLBACK_COUNTRY") {
        config = config.with_fallback_country(CountryCode::parse_normalized(&code)?);
    }
    if let Some(timeout) = env_millis("ROUTE_COST_PRICE_TIMEOUT_MS")? {
        config = config.with_price_source_timeout(timeout);
    }
    let deadline = env_millis("ROUTE_COST_REQUEST_TIMEOUT_MS")?.unwrap_or(DEFAULT_REQUEST_DEADLINE);

    let cache = Arc::new(ResultCache::new(&CacheConfig::default()));
    let engine = CostEngine::new(source, PricingTables::european(), cache, config);

    // Build app state
    let mut state =
        AppState::new(engine, StraightLineProvider::default()).with_request_deadline(deadline);
    if let Some(path) = price_data {
        state = state.with_price_data(path);
    }

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr: SocketAddr = match std::env::var("ROUTE_COST_ADDR") {
        Ok(addr) => addr.parse()?,
        Err(_) => SocketAddr::from(([127, 0, 0, 1], 3000)),
    };
    info!(%addr, "route cost server listening");
    info!("  GET  /health                - Health check");
    info!("  POST /api/cost              - Price a route");
    info!("  POST /api/trip              - Route and price a trip");
    info!("  GET  /api/classify          - Country of a point");
    info!("  POST /api/cache/invalidate  - Drop cached results");
    info!("  POST /api/prices/reload     - Reload the price data file");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
