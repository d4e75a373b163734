//! Price conversion and formatting routes.
//!
//! Amounts that are not numbers, or are negative, are echoed back
//! unconverted so a pricing problem never breaks the caller's page.

use std::str::FromStr;

use axum::{Json, Router, extract::State, routing::post};
use currex_core::pricing::PriceTarget;
use currex_shared::{AppError, CouponId, CurrencyCode, Money, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{AppState, error::ApiResult};

/// Creates the price routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/prices/convert", post(convert_price))
        .route("/prices/format", post(format_price))
}

/// Request body for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Amount to convert, as a JSON number or numeric string.
    pub amount: Value,
    /// Source currency; defaults to the shop base currency.
    pub from: Option<String>,
    /// Target currency.
    pub to: String,
    /// Fixed price in the target currency, bypassing rates.
    #[serde(rename = "override")]
    pub override_price: Option<Decimal>,
    /// Product whose fixed price applies.
    pub product_id: Option<ProductId>,
    /// Coupon whose fixed amount applies.
    pub coupon_id: Option<CouponId>,
    /// Round to the target currency's decimals for charging.
    #[serde(default)]
    pub round: bool,
}

/// Response for a conversion.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    /// Source currency.
    pub from: CurrencyCode,
    /// Target currency.
    pub to: CurrencyCode,
    /// Amount as received.
    pub amount: Value,
    /// Converted amount, or the input when it was not convertible.
    pub converted: Value,
    /// Converted amount rendered for display.
    pub formatted: Option<String>,
    /// Whether a fixed price was used.
    pub overridden: bool,
}

fn numeric_amount(amount: &Value) -> Option<Decimal> {
    let text = match amount {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// POST `/prices/convert` - Convert an amount between currencies.
async fn convert_price(
    State(state): State<AppState>,
    Json(payload): Json<ConvertRequest>,
) -> ApiResult<Json<ConvertResponse>> {
    let from = match payload.from.as_deref() {
        Some(raw) => CurrencyCode::parse(raw)?,
        None => state.settings.base,
    };
    let to = CurrencyCode::parse(&payload.to)?;

    let target = match (payload.product_id, payload.coupon_id) {
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "Give either product_id or coupon_id, not both".into(),
            )
            .into());
        }
        (Some(id), None) => Some(PriceTarget::Product(id)),
        (None, Some(id)) => Some(PriceTarget::Coupon(id)),
        (None, None) => None,
    };

    let Some(raw) = numeric_amount(&payload.amount).filter(|a| !a.is_sign_negative() || a.is_zero())
    else {
        debug!(amount = %payload.amount, "Amount is not convertible, passing through");
        return Ok(Json(ConvertResponse {
            from,
            to,
            converted: payload.amount.clone(),
            amount: payload.amount,
            formatted: None,
            overridden: false,
        }));
    };

    let override_price = payload
        .override_price
        .or_else(|| target.and_then(|t| state.overrides.price_for(t, to)));

    let converted = if payload.round {
        state
            .converter
            .convert_rounded(raw, from, to, override_price, state.formatter.decimals(to))
    } else {
        state
            .converter
            .convert_money(Money::new(raw, from), to, override_price)
            .amount
    };

    Ok(Json(ConvertResponse {
        from,
        to,
        amount: payload.amount,
        converted: Value::String(converted.to_string()),
        formatted: Some(state.formatter.format_price(converted, to)),
        overridden: override_price.is_some(),
    }))
}

/// Request body for formatting.
#[derive(Debug, Deserialize)]
pub struct FormatRequest {
    /// Amount to render.
    pub amount: Decimal,
    /// Currency to render it in.
    pub currency: String,
}

/// Response for formatting.
#[derive(Debug, Serialize)]
pub struct FormatResponse {
    /// Currency used.
    pub currency: CurrencyCode,
    /// Rendered amount, e.g. `$1,234.50`.
    pub formatted: String,
}

/// POST `/prices/format` - Render an amount with the currency's display settings.
async fn format_price(
    State(state): State<AppState>,
    Json(payload): Json<FormatRequest>,
) -> ApiResult<Json<FormatResponse>> {
    let currency = CurrencyCode::parse(&payload.currency)?;
    Ok(Json(FormatResponse {
        currency,
        formatted: state.formatter.format_price(payload.amount, currency),
    }))
}
