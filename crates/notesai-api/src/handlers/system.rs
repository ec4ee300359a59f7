//! Health, rate-limit status and API description.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
    Json,
};
use utoipa::OpenApi;

use crate::error::ApiError;
use crate::routes::ApiDoc;
use crate::state::AppState;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses((status = 200, description = "Server is up"))
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.model,
    }))
}

/// Whether the global rate limiter is active.
#[utoipa::path(
    get,
    path = "/api/v1/rate-limit/status",
    tag = "System",
    responses((status = 200, description = "Rate limiting status"))
)]
pub async fn rate_limit_status(State(state): State<AppState>) -> impl IntoResponse {
    if state.rate_limiter.is_some() {
        Json(serde_json::json!({
            "enabled": true,
            "message": "Rate limiting is active"
        }))
    } else {
        Json(serde_json::json!({
            "enabled": false,
            "message": "Rate limiting is disabled"
        }))
    }
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Reject requests once the global quota is spent.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(subsystem = "api", "Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }
    }
    Ok(next.run(request).await)
}
