// src/handlers/health.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::config::Config;

/// Liveness plus the generation settings this instance runs with.
pub async fn health(State(config): State<Config>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model": config.llm_model,
        "question_count": config.question_count,
    }))
}
