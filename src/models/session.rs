// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::quiz::PublicQuestion,
    quiz::{GradeOutcome, session::Feedback},
};

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// State of the quiz currently loaded in a session.
#[derive(Debug, Serialize)]
pub struct QuizStateResponse {
    pub loaded: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for submitting answers.
/// Positional: entry `i` answers question `i`; `null` or `""` means no answer.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub answers: Vec<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub feedback: Vec<Feedback>,
}

impl From<GradeOutcome> for GradeResponse {
    fn from(outcome: GradeOutcome) -> Self {
        let message = outcome.message();
        match outcome {
            GradeOutcome::Scored(score) => Self {
                message,
                correct: Some(score.correct),
                total: Some(score.total),
                feedback: score.feedback,
            },
            GradeOutcome::NoQuizLoaded => Self {
                message,
                correct: None,
                total: None,
                feedback: Vec::new(),
            },
        }
    }
}
