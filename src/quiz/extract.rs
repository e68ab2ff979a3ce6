// src/quiz/extract.rs

use std::fmt;

use serde_json::Value;

/// Text expected right before the questions array in the final quiz object.
pub const QUESTIONS_MARKER: &str = "\"questions\":";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    MarkerNotFound,
    NoBraces,
    InvalidJson(String),
    /// Parsed, but the object has no `questions` array.
    MissingQuestions,
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::MarkerNotFound => {
                write!(f, "model output does not contain {}", QUESTIONS_MARKER)
            }
            ExtractionError::NoBraces => write!(f, "no JSON object bounds in model output"),
            ExtractionError::InvalidJson(msg) => write!(f, "extracted text is not JSON: {}", msg),
            ExtractionError::MissingQuestions => write!(f, "extracted JSON has no questions array"),
        }
    }
}

impl std::error::Error for ExtractionError {}

/// Recovers the quiz object from free-form model output.
///
/// The model may emit reasoning, draft JSON, or commentary around the
/// answer. Anchoring on the *last* marker skips earlier drafts; the object
/// is then bounded by the first `{` and the last `}` of the candidate.
pub fn extract_quiz_json(raw: &str) -> Result<String, ExtractionError> {
    let marker_idx = raw
        .rfind(QUESTIONS_MARKER)
        .ok_or(ExtractionError::MarkerNotFound)?;

    let candidate = format!("{{{}", raw[marker_idx..].trim());

    let start = candidate.find('{').ok_or(ExtractionError::NoBraces)?;
    let end = candidate.rfind('}').ok_or(ExtractionError::NoBraces)?;
    if end < start {
        return Err(ExtractionError::NoBraces);
    }
    let bounded = &candidate[start..=end];

    let value: Value =
        serde_json::from_str(bounded).map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;

    if !value.get("questions").is_some_and(Value::is_array) {
        return Err(ExtractionError::MissingQuestions);
    }

    Ok(bounded.to_string())
}
