//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting the proxy routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

/// Middleware that checks `Authorization: Bearer <token>` against the configured
/// proxy token.
///
/// When no token is configured every request passes. Otherwise a missing or
/// mismatched token returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !is_authorized(state.config.proxy_api_token.as_deref(), req.headers()) {
        warn!(path = %req.uri().path(), "Rejected request without a valid bearer token");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

fn is_authorized(expected: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    bearer_token(headers).is_some_and(|token| token == expected)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}
