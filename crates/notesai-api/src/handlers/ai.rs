//! `/api/ai/*` handlers.
//!
//! Each endpoint is a thin shell over the [`AiAssistant`]: decode the body,
//! delegate, and map failures to a 400 (bad input) or 500 (upstream).
//!
//! [`AiAssistant`]: notesai_core::AiAssistant

use std::time::Instant;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use notesai_core::NoteExcerpt;

use crate::error::ApiError;
use crate::state::AppState;

pub const GENERATE_FAILED: &str = "Failed to generate note";
pub const ENHANCE_FAILED: &str = "Something went wrong.";
pub const ANSWER_FAILED: &str = "Failed to generate answer";

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Topic of the note to write.
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnhanceRequest {
    /// Existing note content to rewrite.
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    #[serde(default)]
    pub question: String,
    /// Notes to answer from. Extra fields (ids, colors) are ignored.
    #[serde(default)]
    pub notes: Vec<NoteExcerpt>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContentResponse {
    pub content: String,
}

/// Write a new plain-text note about a topic.
#[utoipa::path(
    post,
    path = "/api/ai/generate",
    tag = "AI",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated note body", body = ContentResponse),
        (status = 400, description = "Prompt missing or blank"),
        (status = 500, description = "Completion service failed")
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<ContentResponse>, ApiError> {
    let Json(req) = body?;
    let start = Instant::now();
    let content = state
        .assistant
        .generate(&req.prompt)
        .await
        .map_err(|e| ApiError::from_ai(e, GENERATE_FAILED))?;
    info!(
        subsystem = "api",
        op = "generate",
        prompt_len = req.prompt.len(),
        response_len = content.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Note generated"
    );
    Ok(Json(ContentResponse { content }))
}

/// Rewrite a note for clarity.
#[utoipa::path(
    post,
    path = "/api/ai/enhance",
    tag = "AI",
    request_body = EnhanceRequest,
    responses(
        (status = 200, description = "Enhanced note body", body = ContentResponse),
        (status = 400, description = "Content missing or blank"),
        (status = 500, description = "Completion service failed")
    )
)]
pub async fn enhance(
    State(state): State<AppState>,
    body: Result<Json<EnhanceRequest>, JsonRejection>,
) -> Result<Json<ContentResponse>, ApiError> {
    let Json(req) = body?;
    let start = Instant::now();
    let content = state
        .assistant
        .enhance(&req.content)
        .await
        .map_err(|e| ApiError::from_ai(e, ENHANCE_FAILED))?;
    info!(
        subsystem = "api",
        op = "enhance",
        response_len = content.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Note enhanced"
    );
    Ok(Json(ContentResponse { content }))
}

/// Answer a question using only the supplied notes.
#[utoipa::path(
    post,
    path = "/api/ai/answer",
    tag = "AI",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer text", body = ContentResponse),
        (status = 400, description = "Question blank or no notes"),
        (status = 500, description = "Completion service failed")
    )
)]
pub async fn answer(
    State(state): State<AppState>,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<ContentResponse>, ApiError> {
    let Json(req) = body?;
    let start = Instant::now();
    let content = state
        .assistant
        .answer(&req.question, &req.notes)
        .await
        .map_err(|e| ApiError::from_ai(e, ANSWER_FAILED))?;
    info!(
        subsystem = "api",
        op = "answer",
        result_count = req.notes.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Question answered"
    );
    Ok(Json(ContentResponse { content }))
}
