//! # notesai-api
//!
//! HTTP server exposing the NotesAI AI endpoints:
//! `POST /api/ai/generate`, `POST /api/ai/enhance`, `POST /api/ai/answer`,
//! plus `/health`, `/api/v1/rate-limit/status` and `/openapi.json`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod state;

pub use config::{parse_allowed_origins, GlobalRateLimiter, ServerConfig};
pub use error::ApiError;
pub use routes::{build_router, ApiDoc, MakeRequestUuidV7};
pub use state::AppState;
