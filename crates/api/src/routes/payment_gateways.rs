//! Payment gateway availability routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use currex_shared::CurrencyCode;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiResult};

/// Creates the payment gateway routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/payment-gateways", get(list_gateways))
}

/// Query parameters for gateway availability.
#[derive(Debug, Deserialize)]
pub struct GatewayQuery {
    /// Currency the customer will pay in.
    pub currency: String,
    /// Comma separated gateway ids to filter; defaults to every restricted gateway.
    pub gateways: Option<String>,
}

/// Gateways usable for a currency.
#[derive(Debug, Serialize)]
pub struct GatewayResponse {
    /// Currency checked.
    pub currency: CurrencyCode,
    /// Gateways accepting it, in request order.
    pub gateways: Vec<String>,
}

/// GET `/payment-gateways` - Gateways accepting the given currency.
async fn list_gateways(
    State(state): State<AppState>,
    Query(query): Query<GatewayQuery>,
) -> ApiResult<Json<GatewayResponse>> {
    let currency = CurrencyCode::parse(&query.currency)?;
    let restrictions = &state.settings.gateways;

    let gateways = match query.gateways.as_deref() {
        Some(raw) => restrictions
            .allowed_gateways(
                currency,
                raw.split(',').map(str::trim).filter(|g| !g.is_empty()),
            )
            .into_iter()
            .map(str::to_string)
            .collect(),
        None => restrictions
            .iter()
            .filter(|(_, currencies)| currencies.contains(&currency))
            .map(|(gateway, _)| gateway.to_string())
            .collect(),
    };

    Ok(Json(GatewayResponse { currency, gateways }))
}
