// src/handlers/quiz.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::{GenerateQuizResponse, TopicRequest},
    quiz::QuizGenerator,
};

/// Generates a quiz without touching any session.
///
/// Returns the extracted quiz JSON, or a sentinel payload when the topic is
/// blank or the model output could not be used. Always 200 for a valid body.
pub async fn generate_quiz(
    State(generator): State<QuizGenerator>,
    Json(payload): Json<TopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let generated = generator.generate(&payload.topic).await;

    Ok(Json(GenerateQuizResponse::from(generated)))
}
