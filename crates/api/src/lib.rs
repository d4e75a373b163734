//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for rates, prices and the visitor's currency
//! - Admin token middleware
//! - Error responses

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use currex_core::currency::CurrencyRegistry;
use currex_core::pricing::{PriceConverter, PriceFormatter, PriceOverrideSource};
use currex_core::rates::RateService;
use currex_core::session::{GeoLocator, HeaderGeoLocator, SessionCurrencyResolver};
use currex_core::settings::{ConfigurationError, ShopSettings};
use currex_shared::{AppConfig, SessionConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Exchange rate service.
    pub rates: Arc<RateService>,
    /// Currency reference data.
    pub registry: Arc<CurrencyRegistry>,
    /// Validated shop settings.
    pub settings: Arc<ShopSettings>,
    /// Price converter.
    pub converter: PriceConverter,
    /// Price formatter.
    pub formatter: PriceFormatter,
    /// Fixed prices set by the shop admin.
    pub overrides: Arc<dyn PriceOverrideSource>,
    /// Visitor currency resolver.
    pub resolver: Arc<SessionCurrencyResolver>,
    /// Visitor geolocation.
    pub geo: Arc<dyn GeoLocator>,
    /// Session cookie settings.
    pub session: Arc<SessionConfig>,
    /// Bearer token for admin routes; admin routes are closed when unset.
    pub admin_token: Option<Arc<str>>,
    /// Age after which the rate table is reported stale.
    pub max_age: Duration,
}

impl AppState {
    /// Wires the state from configuration and already-built services.
    pub fn new(
        config: &AppConfig,
        registry: Arc<CurrencyRegistry>,
        rates: Arc<RateService>,
        overrides: Arc<dyn PriceOverrideSource>,
    ) -> Result<Self, ConfigurationError> {
        let settings = ShopSettings::from_config(&config.shop)?;
        let converter = PriceConverter::new(Arc::clone(&rates), settings.base);
        let formatter = PriceFormatter::new(Arc::clone(&registry), Arc::new(settings.display.clone()));
        let resolver = Arc::new(settings.resolver());

        Ok(Self {
            rates,
            registry,
            converter,
            formatter,
            overrides,
            resolver,
            geo: Arc::new(HeaderGeoLocator::new(config.shop.geo_header.clone())),
            session: Arc::new(config.session.clone()),
            admin_token: config.server.admin_token.as_deref().map(Arc::from),
            max_age: Duration::from_secs(config.rates.max_age_secs),
            settings: Arc::new(settings),
        })
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
