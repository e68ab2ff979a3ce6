// src/quiz/generator.rs

use std::fmt;
use std::sync::Arc;

use crate::{
    config::Config,
    llm::{LlmError, TextGenerator},
    quiz::{
        extract::{ExtractionError, extract_quiz_json},
        prompt::build_messages,
    },
};

/// Payload returned for a blank topic. JSON-shaped but never a loadable quiz.
pub const EMPTY_TOPIC_SENTINEL: &str = r#"{"questions": []}"#;

/// Payload returned when no quiz could be recovered from the model.
pub const EXTRACTION_FAILED_SENTINEL: &str = r#"{"error": "quiz extraction failed"}"#;

/// Why a generation attempt produced no quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    Backend(LlmError),
    Extraction(ExtractionError),
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationFailure::Backend(e) => write!(f, "{}", e),
            GenerationFailure::Extraction(e) => write!(f, "{}", e),
        }
    }
}

/// Result of one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// Extracted quiz JSON, guaranteed to parse and to carry a `questions` array.
    Quiz(String),
    /// Topic was blank; the model was not called.
    EmptyTopic,
    Failed(GenerationFailure),
}

impl Generated {
    /// Short machine-readable tag for API responses.
    pub fn outcome(&self) -> &'static str {
        match self {
            Generated::Quiz(_) => "quiz",
            Generated::EmptyTopic => "empty_topic",
            Generated::Failed(_) => "failed",
        }
    }

    /// JSON text for the quiz, or the matching sentinel payload.
    pub fn text(&self) -> &str {
        match self {
            Generated::Quiz(json) => json,
            Generated::EmptyTopic => EMPTY_TOPIC_SENTINEL,
            Generated::Failed(_) => EXTRACTION_FAILED_SENTINEL,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Generated::Quiz(json) => json,
            other => other.text().to_string(),
        }
    }
}

/// Turns a topic into quiz JSON using a shared text generator.
#[derive(Clone)]
pub struct QuizGenerator {
    backend: Arc<dyn TextGenerator>,
    question_count: usize,
    max_tokens: u32,
    temperature: f32,
}

impl QuizGenerator {
    pub fn new(
        backend: Arc<dyn TextGenerator>,
        question_count: usize,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            backend,
            question_count,
            max_tokens,
            temperature,
        }
    }

    pub fn from_config(backend: Arc<dyn TextGenerator>, config: &Config) -> Self {
        Self::new(
            backend,
            config.question_count,
            config.llm_max_tokens,
            config.llm_temperature,
        )
    }

    /// Generates a quiz for `topic`.
    ///
    /// Calls the model at most once and never fails: blank topics,
    /// backend errors and unusable output all come back as a variant.
    pub async fn generate(&self, topic: &str) -> Generated {
        if topic.trim().is_empty() {
            tracing::info!("Empty topic submitted, skipping inference");
            return Generated::EmptyTopic;
        }

        tracing::info!(topic = %topic.trim(), "Generating quiz");

        let messages = build_messages(topic, self.question_count);
        let raw = match self
            .backend
            .generate(&messages, self.max_tokens, self.temperature)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Quiz generation failed: {}", e);
                return Generated::Failed(GenerationFailure::Backend(e));
            }
        };

        tracing::debug!(raw = %raw, "Model output");

        match extract_quiz_json(&raw) {
            Ok(json) => {
                tracing::debug!(json = %json, "Extracted quiz");
                Generated::Quiz(json)
            }
            Err(e) => {
                tracing::warn!("Could not extract quiz from model output: {}", e);
                Generated::Failed(GenerationFailure::Extraction(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed reply and counts invocations.
    struct ScriptedBackend {
        reply: Result<String, LlmError>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(reply: Result<String, LlmError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedBackend {
        async fn generate(
            &self,
            messages: &[ChatMessage],
            max_tokens: u32,
            temperature: f32,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(messages.len(), 2);
            assert_eq!(max_tokens, 1000);
            assert!((temperature - 0.7).abs() < f32::EPSILON);
            self.reply.clone()
        }
    }

    fn generator(backend: Arc<ScriptedBackend>) -> QuizGenerator {
        QuizGenerator::new(backend, 5, 1000, 0.7)
    }

    #[tokio::test]
    async fn test_blank_topic_skips_inference() {
        let backend = ScriptedBackend::new(Ok("unused".to_string()));
        let quiz_generator = generator(backend.clone());

        for topic in ["", "   ", "\n\t"] {
            let generated = quiz_generator.generate(topic).await;
            assert_eq!(generated, Generated::EmptyTopic);
            assert_eq!(generated.text(), EMPTY_TOPIC_SENTINEL);
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extracts_quiz_from_reasoning_output() {
        let raw = r#"analysis: The user wants a quiz. {"questions": "draft"}
Final Answer:{"questions": [{"question": "Largest planet?", "options": ["Mars", "Jupiter", "Venus", "Earth"], "answer": "Jupiter"}]}
Done."#;
        let backend = ScriptedBackend::new(Ok(raw.to_string()));
        let quiz_generator = generator(backend.clone());

        let generated = quiz_generator.generate("planets").await;
        assert_eq!(generated.outcome(), "quiz");
        let value: serde_json::Value = serde_json::from_str(generated.text()).unwrap();
        assert_eq!(value["questions"][0]["answer"], "Jupiter");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unusable_output_yields_sentinel() {
        let backend = ScriptedBackend::new(Ok("Sorry, I can't do that.".to_string()));
        let generated = generator(backend.clone()).generate("history").await;

        assert_eq!(
            generated,
            Generated::Failed(GenerationFailure::Extraction(
                ExtractionError::MarkerNotFound
            ))
        );
        assert_eq!(generated.into_text(), EXTRACTION_FAILED_SENTINEL);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backend_error_is_absorbed() {
        let backend = ScriptedBackend::new(Err(LlmError::Transport("refused".to_string())));
        let generated = generator(backend.clone()).generate("history").await;

        assert_eq!(generated.outcome(), "failed");
        assert_eq!(generated.text(), EXTRACTION_FAILED_SENTINEL);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
