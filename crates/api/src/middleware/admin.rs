//! Admin token middleware for operator routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use currex_shared::AppError;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Compares without short-circuiting on the first differing byte.
fn tokens_match(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Admits requests carrying the configured admin bearer token.
///
/// Without a configured token every request is refused.
pub async fn admin_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.admin_token.as_deref() else {
        return ApiError(AppError::Forbidden("Admin routes are disabled".into())).into_response();
    };

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token);

    match token {
        Some(token) if tokens_match(token, expected) => next.run(request).await,
        Some(_) => {
            warn!(path = %request.uri().path(), "Rejected admin request with wrong token");
            ApiError(AppError::Unauthorized("Invalid admin token".into())).into_response()
        }
        None => ApiError(AppError::Unauthorized(
            "Authorization header with Bearer token is required".into(),
        ))
        .into_response(),
    }
}
