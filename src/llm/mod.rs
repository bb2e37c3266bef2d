//! Language model access
//!
//! The pipeline talks to the model through [`ChatModel`]; [`LlmService`] is the
//! HTTP implementation for Ollama and `OpenAI`-compatible chat endpoints.

pub mod client;
pub mod prompts;

use async_trait::async_trait;
pub use client::LlmProvider;
pub use client::LlmService;
pub use prompts::PromptTemplate;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Result;

/// Single chat message sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Model invocation: messages in, raw completion text out
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
