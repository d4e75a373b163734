//! Currex API Server
//!
//! Main entry point for the Currex rate and pricing service.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currex_api::{AppState, create_router};
use currex_core::currency::CurrencyRegistry;
use currex_core::pricing::InMemoryPriceOverrides;
use currex_core::rates::{RateService, RefreshScheduler};
use currex_provider::{HttpRateFetcher, JsonFileSnapshotRepository};
use currex_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "currex=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    let registry = Arc::new(CurrencyRegistry::load(
        config.shop.currency_dataset_path.as_deref().map(Path::new),
    ));
    info!(currencies = registry.len(), "Currency registry loaded");

    // Rate service with optional on-disk snapshots
    let fetcher = Arc::new(HttpRateFetcher::from_config(&config.rates)?);
    let mut service = RateService::new(fetcher, Duration::from_secs(config.rates.timeout_secs));
    if let Some(path) = &config.rates.snapshot_path {
        service = service.with_snapshots(Arc::new(JsonFileSnapshotRepository::new(path)));
    }
    let service = Arc::new(service);
    if !service.warm_start().await {
        warn!("No usable rate snapshot, rates stay at fallback until the first refresh");
    }

    let state = AppState::new(
        &config,
        Arc::clone(&registry),
        Arc::clone(&service),
        Arc::new(InMemoryPriceOverrides::new()),
    )?;

    // Background refresh
    RefreshScheduler::new(
        Arc::clone(&service),
        state.settings.base,
        Duration::from_secs(config.rates.refresh_interval_secs),
        Duration::from_secs(config.rates.max_age_secs),
    )
    .spawn();

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
