// src/llm/mod.rs

pub mod openai;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiCompatibleClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message of a chat-style prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The request never produced an HTTP response (connect, timeout, ...).
    Transport(String),
    Status { status: u16, body: String },
    /// The backend answered without any generated text.
    EmptyResponse,
    Decode(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Transport(msg) => write!(f, "inference request failed: {}", msg),
            LlmError::Status { status, body } => {
                write!(f, "inference backend returned {}: {}", status, body)
            }
            LlmError::EmptyResponse => write!(f, "inference backend returned no text"),
            LlmError::Decode(msg) => write!(f, "could not decode inference response: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

/// A text-generation capability.
///
/// Implementations are expensive to construct (model handles, HTTP pools)
/// and are built once per process, then shared behind an `Arc`.
/// One call is one blocking round-trip to the model; there are no retries.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError>;
}
