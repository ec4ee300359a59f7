//! HTTP error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Errors returned by handlers as `{"error": msg}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
    RateLimited,
}

impl ApiError {
    /// Map an assistant failure: validation keeps its message as a 400,
    /// anything else becomes a 500 with the route's public message.
    pub fn from_ai(err: notesai_core::Error, public_message: &str) -> Self {
        match err {
            notesai_core::Error::Validation(msg) => ApiError::BadRequest(msg),
            other => {
                tracing::error!(error = %other, "AI request failed");
                ApiError::Internal(public_message.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please wait before retrying.".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
