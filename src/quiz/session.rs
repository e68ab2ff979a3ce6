// src/quiz/session.rs

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::quiz::labels::resolve_option;

/// One multiple-choice item as produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    /// `None` when the model omitted the field or gave a non-string.
    pub answer: Option<String>,
    /// Position of `answer` within `options`, when it names one.
    pub answer_index: Option<usize>,
    /// False when `answer` is missing or is not one of `options`.
    /// Such a question is displayed but can never be marked correct.
    pub scorable: bool,
}

impl Question {
    pub fn new(text: impl Into<String>, options: Vec<String>, answer: Option<String>) -> Self {
        let answer_index = answer
            .as_deref()
            .and_then(|a| resolve_option(a, &options));
        Self {
            text: text.into(),
            options,
            answer,
            answer_index,
            scorable: answer_index.is_some(),
        }
    }

    /// Lenient conversion of one element of the `questions` array.
    fn from_value(value: &Value) -> Self {
        let text = value
            .get("question")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let options = value
            .get("options")
            .and_then(Value::as_array)
            .map(|opts| {
                opts.iter()
                    .map(|o| match o {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let answer = value
            .get("answer")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self::new(text, options, answer)
    }
}

/// An immutable, loaded quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quiz {
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    InvalidJson(String),
    /// Valid JSON but no non-empty `questions` array.
    NoQuestions,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::InvalidJson(_) | ParseFailure::NoQuestions => write!(
                f,
                "Could not load a quiz from the generated output. Please submit the topic again."
            ),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// Parses generator output into a quiz.
///
/// Question order is preserved; options are not deduplicated. Questions whose
/// answer is not among their options are kept and flagged unscorable.
pub fn load(json_text: &str) -> Result<Quiz, ParseFailure> {
    let value: Value =
        serde_json::from_str(json_text).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;

    let items = value
        .get("questions")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or(ParseFailure::NoQuestions)?;

    let questions: Vec<Question> = items.iter().map(Question::from_value).collect();

    let unscorable = questions.iter().filter(|q| !q.scorable).count();
    if unscorable > 0 {
        tracing::warn!(
            "{} of {} generated questions have no valid answer among their options",
            unscorable,
            questions.len()
        );
    }

    Ok(Quiz { questions })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Correct,
    Incorrect,
    /// No selection was made; counts neither way.
    Skipped,
    /// A selection was made but the question has no usable answer key.
    Unscorable,
}

/// Per-question grading detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub index: usize,
    pub status: AnswerStatus,
    pub selected: Option<String>,
    pub expected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub feedback: Vec<Feedback>,
}

impl Score {
    pub fn summary(&self) -> String {
        format!("Your score: {} / {}", self.correct, self.total)
    }
}

pub const NO_QUIZ_LOADED_MESSAGE: &str = "No quiz loaded. Submit a topic first.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeOutcome {
    Scored(Score),
    NoQuizLoaded,
}

impl GradeOutcome {
    /// Display text for the result box.
    pub fn message(&self) -> String {
        match self {
            GradeOutcome::Scored(score) => score.summary(),
            GradeOutcome::NoQuizLoaded => NO_QUIZ_LOADED_MESSAGE.to_string(),
        }
    }
}

/// Grades positional `submissions` against `quiz`.
///
/// Missing or blank submissions are skipped; extra submissions are ignored.
/// Pure: the same inputs always give the same outcome.
pub fn grade(quiz: Option<&Quiz>, submissions: &[Option<String>]) -> GradeOutcome {
    let Some(quiz) = quiz else {
        return GradeOutcome::NoQuizLoaded;
    };

    let feedback: Vec<Feedback> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = submissions
                .get(index)
                .and_then(Option::as_deref)
                .filter(|s| !s.trim().is_empty());

            // Both sides resolve to an option index, so options that only
            // differ by a leading initial are never confused.
            let status = match (selected, question.answer_index) {
                (None, _) => AnswerStatus::Skipped,
                (Some(_), None) => AnswerStatus::Unscorable,
                (Some(sel), Some(expected)) => {
                    if resolve_option(sel, &question.options) == Some(expected) {
                        AnswerStatus::Correct
                    } else {
                        AnswerStatus::Incorrect
                    }
                }
            };

            Feedback {
                index,
                status,
                selected: selected.map(str::to_string),
                expected: question.answer.clone(),
            }
        })
        .collect();

    let correct = feedback
        .iter()
        .filter(|f| f.status == AnswerStatus::Correct)
        .count();

    GradeOutcome::Scored(Score {
        correct,
        total: quiz.len(),
        feedback,
    })
}

/// The quiz currently loaded for one user session.
#[derive(Debug, Default, Clone)]
pub struct QuizSession {
    current: Option<Quiz>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Quiz> {
        self.current.as_ref()
    }

    /// Replaces the loaded quiz. A failed load leaves no quiz loaded.
    pub fn load(&mut self, json_text: &str) -> Result<&Quiz, ParseFailure> {
        self.current = None;
        let quiz = load(json_text)?;
        Ok(&*self.current.insert(quiz))
    }

    pub fn grade(&self, submissions: &[Option<String>]) -> GradeOutcome {
        grade(self.current.as_ref(), submissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::generator::{EMPTY_TOPIC_SENTINEL, EXTRACTION_FAILED_SENTINEL};

    fn two_question_quiz() -> Quiz {
        Quiz {
            questions: vec![
                Question::new("Q1", vec!["A".into(), "B".into()], Some("A".into())),
                Question::new("Q2", vec!["A".into(), "B".into()], Some("B".into())),
            ],
        }
    }

    fn answers(items: &[&str]) -> Vec<Option<String>> {
        items.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn test_load_single_question() {
        let quiz =
            load(r#"{"questions": [{"question":"Q1","options":["A","B"],"answer":"A"}]}"#).unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz.questions[0].text, "Q1");
        assert_eq!(quiz.questions[0].options, vec!["A", "B"]);
        assert_eq!(quiz.questions[0].answer.as_deref(), Some("A"));
        assert!(quiz.questions[0].scorable);
    }

    #[test]
    fn test_load_rejects_empty_questions() {
        assert_eq!(load(r#"{"questions": []}"#), Err(ParseFailure::NoQuestions));
        assert_eq!(load(EMPTY_TOPIC_SENTINEL), Err(ParseFailure::NoQuestions));
        assert_eq!(
            load(EXTRACTION_FAILED_SENTINEL),
            Err(ParseFailure::NoQuestions)
        );
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        assert!(matches!(
            load("not json at all"),
            Err(ParseFailure::InvalidJson(_))
        ));
    }

    #[test]
    fn test_load_flags_malformed_questions() {
        let quiz = load(
            r#"{"questions": [
                {"question": "No answer", "options": ["x", "y"]},
                {"question": "Answer not an option", "options": ["x", "y"], "answer": "z"},
                {"question": "No options", "answer": "x"},
                42
            ]}"#,
        )
        .unwrap();
        assert_eq!(quiz.len(), 4);
        assert!(quiz.questions.iter().all(|q| !q.scorable));
        assert_eq!(quiz.questions[3].text, "");
    }

    #[test]
    fn test_load_keeps_duplicate_options_in_order() {
        let quiz = load(
            r#"{"questions": [{"question": "Q", "options": ["b", "a", "b"], "answer": "a"}]}"#,
        )
        .unwrap();
        assert_eq!(quiz.questions[0].options, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_grade_skips_empty_submission() {
        let quiz = two_question_quiz();
        let outcome = grade(Some(&quiz), &answers(&["A", ""]));

        let GradeOutcome::Scored(score) = outcome else {
            panic!("expected a score");
        };
        assert_eq!((score.correct, score.total), (1, 2));
        assert_eq!(score.feedback[0].status, AnswerStatus::Correct);
        assert_eq!(score.feedback[1].status, AnswerStatus::Skipped);
        assert_eq!(score.summary(), "Your score: 1 / 2");
    }

    #[test]
    fn test_grade_pads_short_and_ignores_extra_submissions() {
        let quiz = two_question_quiz();

        let GradeOutcome::Scored(short) = grade(Some(&quiz), &answers(&["A"])) else {
            panic!("expected a score");
        };
        assert_eq!((short.correct, short.total), (1, 2));
        assert_eq!(short.feedback[1].status, AnswerStatus::Skipped);

        let GradeOutcome::Scored(long) = grade(Some(&quiz), &answers(&["A", "B", "A", "B"]))
        else {
            panic!("expected a score");
        };
        assert_eq!((long.correct, long.total), (2, 2));
        assert_eq!(long.feedback.len(), 2);
    }

    #[test]
    fn test_grade_without_quiz_is_a_message() {
        let outcome = grade(None, &answers(&["A"]));
        assert_eq!(outcome, GradeOutcome::NoQuizLoaded);
        assert_eq!(outcome.message(), NO_QUIZ_LOADED_MESSAGE);
    }

    #[test]
    fn test_grade_is_idempotent() {
        let quiz = two_question_quiz();
        let submissions = answers(&["B", "B"]);
        assert_eq!(
            grade(Some(&quiz), &submissions),
            grade(Some(&quiz), &submissions)
        );
    }

    #[test]
    fn test_grade_accepts_labelled_selection() {
        let quiz = Quiz {
            questions: vec![Question::new(
                "Capital of France?",
                vec!["A. Berlin".into(), "B. Paris".into()],
                Some("Paris".into()),
            )],
        };
        let GradeOutcome::Scored(score) = grade(Some(&quiz), &answers(&["B. Paris"])) else {
            panic!("expected a score");
        };
        assert_eq!(score.correct, 1);
    }

    #[test]
    fn test_grade_keeps_initial_led_options_apart() {
        let quiz = load(
            r#"{"questions": [{"question": "Who wrote Ulysses?",
                "options": ["J. Joyce", "K. Joyce", "T. Eliot", "W. Yeats"],
                "answer": "J. Joyce"}]}"#,
        )
        .unwrap();
        assert_eq!(quiz.questions[0].answer_index, Some(0));

        let GradeOutcome::Scored(wrong) = grade(Some(&quiz), &answers(&["K. Joyce"])) else {
            panic!("expected a score");
        };
        assert_eq!((wrong.correct, wrong.total), (0, 1));
        assert_eq!(wrong.feedback[0].status, AnswerStatus::Incorrect);

        let GradeOutcome::Scored(right) = grade(Some(&quiz), &answers(&["J. Joyce"])) else {
            panic!("expected a score");
        };
        assert_eq!(right.correct, 1);
    }

    #[test]
    fn test_unscorable_question_never_counts() {
        let quiz = Quiz {
            questions: vec![Question::new("Q", vec!["x".into(), "y".into()], None)],
        };
        let GradeOutcome::Scored(score) = grade(Some(&quiz), &answers(&["x"])) else {
            panic!("expected a score");
        };
        assert_eq!((score.correct, score.total), (0, 1));
        assert_eq!(score.feedback[0].status, AnswerStatus::Unscorable);
    }

    #[test]
    fn test_session_failed_load_discards_previous_quiz() {
        let mut session = QuizSession::new();
        session
            .load(r#"{"questions": [{"question":"Q1","options":["A","B"],"answer":"A"}]}"#)
            .unwrap();
        assert!(session.current().is_some());

        assert!(session.load("garbage").is_err());
        assert!(session.current().is_none());
        assert_eq!(session.grade(&answers(&["A"])), GradeOutcome::NoQuizLoaded);
    }
}
