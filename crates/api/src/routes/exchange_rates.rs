//! Exchange rate routes.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use currex_core::rates::RateLookupMethod;
use currex_shared::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{AppState, error::ApiResult};

/// Creates the public exchange rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exchange-rates", get(get_exchange_rates))
        .route("/exchange-rates/pair", get(get_pair_rate))
}

/// Creates the exchange rate routes that need the admin middleware.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/exchange-rates/refresh", post(refresh_exchange_rates))
}

/// Current rate table.
#[derive(Debug, Serialize)]
pub struct ExchangeRatesResponse {
    /// Base of the table, if one is loaded.
    pub base: Option<CurrencyCode>,
    /// Units of each currency per base unit.
    pub rates: BTreeMap<CurrencyCode, Decimal>,
    /// When the table was fetched.
    pub last_updated: Option<DateTime<Utc>>,
    /// Whether the table is missing or older than the configured max age.
    pub stale: bool,
}

/// GET `/exchange-rates` - Current base-relative table.
async fn get_exchange_rates(State(state): State<AppState>) -> Json<ExchangeRatesResponse> {
    let table = state.rates.current_table();
    Json(ExchangeRatesResponse {
        base: table.as_ref().map(|t| t.base()),
        rates: table.as_ref().map(|t| t.rates().clone()).unwrap_or_default(),
        last_updated: table.as_ref().map(|t| t.last_updated()),
        stale: state.rates.needs_refresh(state.max_age),
    })
}

/// Query parameters for a pairwise rate.
#[derive(Debug, Deserialize)]
pub struct PairQuery {
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
}

/// Response for a pairwise rate.
#[derive(Debug, Serialize)]
pub struct PairRateResponse {
    /// Source currency code.
    pub from: CurrencyCode,
    /// Target currency code.
    pub to: CurrencyCode,
    /// Units of `to` per unit of `from`.
    pub rate: Decimal,
    /// How the rate was obtained.
    pub lookup_method: RateLookupMethod,
}

/// GET `/exchange-rates/pair` - Rate between two currencies.
async fn get_pair_rate(
    State(state): State<AppState>,
    Query(query): Query<PairQuery>,
) -> ApiResult<Json<PairRateResponse>> {
    let from = CurrencyCode::parse(&query.from)?;
    let to = CurrencyCode::parse(&query.to)?;

    let lookup = state.rates.lookup_rate(from, to);
    if lookup.method == RateLookupMethod::Fallback {
        warn!(from = %from, to = %to, "Missing exchange rate, falling back to 1 (data integrity)");
    }

    Ok(Json(PairRateResponse {
        from,
        to,
        rate: lookup.rate,
        lookup_method: lookup.method,
    }))
}

/// Request body for a manual refresh.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    /// Base to fetch; defaults to the shop base currency.
    pub base_currency: Option<String>,
}

/// POST `/exchange-rates/refresh` - Fetch a new table now.
async fn refresh_exchange_rates(
    State(state): State<AppState>,
    payload: Option<Json<RefreshRequest>>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.unwrap_or_default();
    let base = match payload.base_currency.as_deref() {
        Some(raw) => CurrencyCode::parse(raw)?,
        None => state.settings.base,
    };

    info!(base = %base, "Manual exchange rate refresh requested");

    let response = match state.rates.refresh(base).await {
        Ok(table) => (
            StatusCode::OK,
            Json(json!({
                "refreshed": true,
                "base": table.base(),
                "entries": table.len(),
                "last_updated": table.last_updated(),
            })),
        ),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "refreshed": false,
                "error": e.kind(),
                "message": e.to_string(),
            })),
        ),
    };
    Ok(response)
}
