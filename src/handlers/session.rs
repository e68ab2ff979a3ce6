// src/handlers/session.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        quiz::{TopicRequest, public_questions},
        session::{CreateSessionResponse, GradeResponse, QuizStateResponse, SubmitAnswersRequest},
    },
    quiz::{Generated, QuizGenerator, session::NO_QUIZ_LOADED_MESSAGE},
    sessions::SessionStore,
};

const EMPTY_TOPIC_MESSAGE: &str = "Please enter a topic to generate a quiz.";

/// Starts a new quiz session with no quiz loaded.
pub async fn create_session(State(sessions): State<SessionStore>) -> impl IntoResponse {
    let (session_id, created_at) = sessions.create().await;
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            created_at,
        }),
    )
}

/// Ends a session and drops its quiz.
pub async fn delete_session(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !sessions.remove(id).await {
        return Err(AppError::NotFound("Session not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Submits a topic: generates a quiz and replaces the session's current one.
///
/// * Blank topics skip inference and leave no quiz loaded.
/// * Unusable model output leaves no quiz loaded; the user can resubmit.
/// * A newer submission for the same session cancels this one (409).
/// * Deleting or expiring the session meanwhile yields 404.
pub async fn submit_topic(
    State(sessions): State<SessionStore>,
    State(generator): State<QuizGenerator>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = sessions.submit_topic(id, &generator, &payload.topic).await?;

    let tag = Some(outcome.generated.outcome());
    let loaded_at = outcome.loaded_at;

    let response = match (outcome.generated, outcome.loaded) {
        (_, Ok(quiz)) => QuizStateResponse {
            loaded: true,
            message: format!("Quiz loaded with {} questions.", quiz.len()),
            outcome: tag,
            loaded_at,
            questions: public_questions(&quiz),
        },
        (Generated::EmptyTopic, Err(_)) => QuizStateResponse {
            loaded: false,
            message: EMPTY_TOPIC_MESSAGE.to_string(),
            outcome: tag,
            loaded_at: None,
            questions: Vec::new(),
        },
        (_, Err(failure)) => QuizStateResponse {
            loaded: false,
            message: failure.to_string(),
            outcome: tag,
            loaded_at: None,
            questions: Vec::new(),
        },
    };

    Ok(Json(response))
}

/// Returns the questions of the loaded quiz, without answers.
pub async fn get_quiz(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let response = match sessions.current_quiz(id).await? {
        Some(current) => QuizStateResponse {
            loaded: true,
            message: format!("Quiz loaded with {} questions.", current.quiz.len()),
            outcome: None,
            loaded_at: Some(current.loaded_at),
            questions: public_questions(&current.quiz),
        },
        None => QuizStateResponse {
            loaded: false,
            message: NO_QUIZ_LOADED_MESSAGE.to_string(),
            outcome: None,
            loaded_at: None,
            questions: Vec::new(),
        },
    };

    Ok(Json(response))
}

/// Grades the submitted answers against the loaded quiz.
///
/// With no quiz loaded the response carries only a message, never a score.
pub async fn submit_answers(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = sessions.grade(id, &payload.answers).await?;

    Ok(Json(GradeResponse::from(outcome)))
}
