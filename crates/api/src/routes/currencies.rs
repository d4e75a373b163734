//! Currency listing routes.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use currex_core::currency::CurrencyDisplaySettings;
use serde::Serialize;
use serde_json::json;

use crate::AppState;

/// Creates the currency routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/currencies", get(list_currencies))
}

/// Response for an enabled currency.
#[derive(Debug, Serialize)]
pub struct CurrencyResponse {
    /// Currency code (ISO 4217).
    pub code: String,
    /// Currency name.
    pub name: String,
    /// Currency symbol.
    pub symbol: String,
    /// Lowercase country code for flag lookup.
    pub country_code: Option<String>,
    /// Whether this is the shop's base currency.
    pub is_base: bool,
    /// How amounts are rendered.
    pub display: CurrencyDisplaySettings,
}

/// GET `/currencies` - List enabled currencies in display order.
async fn list_currencies(State(state): State<AppState>) -> impl IntoResponse {
    let response: Vec<CurrencyResponse> = state
        .settings
        .enabled
        .as_slice()
        .iter()
        .map(|code| {
            let known = state.registry.get(*code);
            CurrencyResponse {
                code: code.to_string(),
                name: known.map_or_else(|| code.to_string(), |c| c.name.clone()),
                symbol: state.registry.symbol(*code),
                country_code: known.and_then(|c| c.country_code.clone()),
                is_base: *code == state.settings.base,
                display: state.formatter.settings(*code),
            }
        })
        .collect();

    Json(json!({
        "base_currency": state.settings.base,
        "currencies": response,
    }))
}
