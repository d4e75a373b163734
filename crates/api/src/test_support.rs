//! Helpers shared by the route tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use chrono::Utc;
use currex_core::currency::CurrencyRegistry;
use currex_core::pricing::{InMemoryPriceOverrides, PriceTarget};
use currex_core::rates::{ExchangeRateTable, FetchError, RateFetcher, RateService, RawRateMap};
use currex_shared::{AppConfig, CurrencyCode, ProductId};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, create_router};

pub(crate) const ADMIN_TOKEN: &str = "test-admin-token";

/// Fetcher answering every base with the same canned rates.
pub(crate) struct FixedFetcher(pub(crate) Result<RawRateMap, FetchError>);

#[async_trait]
impl RateFetcher for FixedFetcher {
    async fn fetch(&self, _base: CurrencyCode, _timeout: Duration) -> Result<RawRateMap, FetchError> {
        self.0.clone()
    }
}

pub(crate) fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.admin_token = Some(ADMIN_TOKEN.to_string());
    config.shop.enabled_currencies = vec!["USD".into(), "EUR".into(), "GBP".into()];
    config.shop.auto_detect = true;
    config
        .shop
        .gateway_restrictions
        .insert("bacs".into(), vec!["GBP".into()]);
    config
}

pub(crate) fn scenario_table() -> ExchangeRateTable {
    ExchangeRateTable::new(
        CurrencyCode::USD,
        [(CurrencyCode::EUR, dec!(0.9)), (CurrencyCode::GBP, dec!(0.8))],
        Utc::now(),
    )
}

pub(crate) fn state_with(config: &AppConfig, fetcher: FixedFetcher) -> AppState {
    let rates = Arc::new(
        RateService::new(Arc::new(fetcher), Duration::from_secs(5)).with_table(scenario_table()),
    );
    let overrides = InMemoryPriceOverrides::new();
    overrides.set(PriceTarget::Product(ProductId::new(1)), CurrencyCode::EUR, dec!(85));

    AppState::new(
        config,
        Arc::new(CurrencyRegistry::bundled()),
        rates,
        Arc::new(overrides),
    )
    .unwrap()
}

pub(crate) fn test_state() -> AppState {
    state_with(
        &test_config(),
        FixedFetcher(Err(FetchError::Transport("offline".into()))),
    )
}

/// Sends `request` through the full router.
pub(crate) async fn send(state: AppState, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

pub(crate) fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub(crate) fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
