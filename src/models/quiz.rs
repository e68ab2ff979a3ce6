// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::quiz::{Generated, Quiz};

/// DTO for submitting a topic.
/// A missing or blank topic is accepted here and short-circuits in the generator.
#[derive(Debug, Deserialize, Validate)]
pub struct TopicRequest {
    #[serde(default)]
    #[validate(length(max = 500))]
    pub topic: String,
}

/// Raw generator output, for callers that render the quiz themselves.
#[derive(Debug, Serialize)]
pub struct GenerateQuizResponse {
    /// One of `quiz`, `empty_topic`, `failed`.
    pub outcome: &'static str,
    /// Quiz JSON or the sentinel payload.
    pub text: String,
}

impl From<Generated> for GenerateQuizResponse {
    fn from(generated: Generated) -> Self {
        Self {
            outcome: generated.outcome(),
            text: generated.into_text(),
        }
    }
}

/// DTO for sending a question to the client (excludes the answer key).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub index: usize,
    pub question: String,
    pub options: Vec<String>,
}

pub fn public_questions(quiz: &Quiz) -> Vec<PublicQuestion> {
    quiz.questions
        .iter()
        .enumerate()
        .map(|(index, q)| PublicQuestion {
            index,
            question: q.text.clone(),
            options: q.options.clone(),
        })
        .collect()
}
