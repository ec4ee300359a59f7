//! Router assembly and middleware stack.

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::config::{parse_allowed_origins, ServerConfig};
use crate::handlers::{ai, system};
use crate::state::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NotesAI API",
        description = "AI note generation, enhancement and question answering"
    ),
    paths(
        ai::generate,
        ai::enhance,
        ai::answer,
        system::health_check,
        system::rate_limit_status
    ),
    components(schemas(
        ai::GenerateRequest,
        ai::EnhanceRequest,
        ai::AnswerRequest,
        ai::ContentResponse,
        notesai_core::NoteExcerpt
    )),
    tags(
        (name = "AI", description = "Completion-backed note operations"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

/// Build the full router with middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let allowed_origins = parse_allowed_origins(&config.allowed_origins);

    Router::new()
        .route("/health", get(system::health_check))
        .route("/openapi.json", get(system::openapi_json))
        .route("/api/ai/generate", post(ai::generate))
        .route("/api/ai/enhance", post(ai::enhance))
        .route("/api/ai/answer", post(ai::answer))
        .route("/api/v1/rate-limit/status", get(system::rate_limit_status))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            system::rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .with_state(state)
}
