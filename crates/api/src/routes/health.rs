//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use currex_core::rates::RateStatus;
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether a rate table has been loaded.
    pub rates_loaded: bool,
    /// Current rate table summary.
    pub rates: RateStatus,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        rates_loaded: state.rates.current_table().is_some(),
        rates: state.rates.status(state.max_age),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{get, send, test_state};
    use axum::http::StatusCode;
    use std::time::Duration;

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = send(test_state(), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["rates_loaded"], true);
        assert_eq!(body["rates"]["base"], "USD");
        assert_eq!(body["rates"]["entries"], 3);
        assert_eq!(body["rates"]["stale"], false);
    }

    #[tokio::test]
    async fn test_health_reports_stale_table() {
        let mut state = test_state();
        state.max_age = Duration::ZERO;
        let (_, _, body) = send(state, get("/api/v1/health")).await;
        assert_eq!(body["rates"]["stale"], true);
    }
}
