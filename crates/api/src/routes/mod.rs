//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::admin_middleware};

pub mod currencies;
pub mod exchange_rates;
pub mod health;
pub mod payment_gateways;
pub mod prices;
pub mod session;

/// Creates the API router with admin routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Operator routes guarded by the admin token
    let admin_routes = Router::new()
        .merge(exchange_rates::admin_routes())
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware));

    Router::new()
        .merge(health::routes())
        .merge(currencies::routes())
        .merge(exchange_rates::routes())
        .merge(prices::routes())
        .merge(session::routes())
        .merge(payment_gateways::routes())
        .merge(admin_routes)
}
