//! Visitor currency routes.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use currex_core::session::{HeaderLookup, RequestSignals, SelectionOrigin, SessionCurrencyState};
use currex_shared::CurrencyCode;
use serde::Serialize;
use tracing::{debug, warn};

use crate::AppState;

/// Creates the session routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/session/currency", get(resolve_currency))
}

/// Request headers seen through the core's header lookup.
struct RequestHeaders<'a>(&'a HeaderMap);

impl HeaderLookup for RequestHeaders<'_> {
    fn header(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Response for a resolution.
#[derive(Debug, Serialize)]
pub struct SessionCurrencyResponse {
    /// Currency governing the request.
    pub currency: CurrencyCode,
    /// How it was decided.
    pub origin: SelectionOrigin,
    /// Whether the stored state changed.
    pub changed: bool,
    /// Encoded state for the caller's session store.
    pub session: String,
}

fn session_cookie(name: &str, state: &SessionCurrencyState, ttl_days: i64) -> Option<Cookie<'static>> {
    let max_age = ttl_days.max(0).saturating_mul(86_400);
    let raw = format!(
        "{name}={}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax",
        state.to_cookie_value()
    );
    match Cookie::parse(raw) {
        Ok(cookie) => Some(cookie),
        Err(e) => {
            warn!(cookie = %name, error = %e, "Could not build currency cookie");
            None
        }
    }
}

/// GET `/session/currency` - Resolve the visitor's active currency.
///
/// Query parameters: the configured currency parameter (default `currency`)
/// and `session`, the caller's stored state such as `EUR:auto`.
async fn resolve_currency(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<SessionCurrencyResponse>) {
    let config = &state.session;
    let cookie = jar.get(&config.cookie_name).map(|c| c.value().to_string());

    // Without a caller-held session the cookie is the stored state.
    let session = params
        .get("session")
        .or(cookie.as_ref())
        .and_then(|raw| SessionCurrencyState::parse_cookie(raw));

    let signals = RequestSignals {
        requested: params.get(&config.query_param).cloned(),
        session,
        cookie,
        country: state.geo.locate(&RequestHeaders(&headers)),
    };

    let resolution = state.resolver.resolve(&signals);
    debug!(
        currency = %resolution.currency,
        changed = resolution.changed,
        country = ?signals.country,
        "Resolved visitor currency"
    );

    let jar = if resolution.changed {
        match session_cookie(&config.cookie_name, &resolution.state, config.cookie_ttl_days) {
            Some(cookie) => jar.add(cookie),
            None => jar,
        }
    } else {
        jar
    };

    (
        jar,
        Json(SessionCurrencyResponse {
            currency: resolution.currency,
            origin: resolution.state.origin,
            changed: resolution.changed,
            session: resolution.state.to_cookie_value(),
        }),
    )
}
