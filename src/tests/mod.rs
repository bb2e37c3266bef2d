//! Test doubles for the embedding and model services

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Barrier;

use crate::embeddings::Embedder;
use crate::errors::RcaError;
use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;

/// Deterministic bag-of-words embedder: each token bumps one hashed dimension
pub struct HashingEmbedder {
    model: String,
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(model: &str, dimension: usize) -> Self {
        Self {
            model: model.to_string(),
            dimension,
        }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new("hashing-test", 64)
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let slot = (fnv1a(&token.to_lowercase()) % self.dimension as u64) as usize;
            vector[slot] += 1.0;
        }
        Ok(vector)
    }
}

/// Embedder whose service is always down
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model(&self) -> &str {
        "unreachable"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RcaError::EmbeddingError("connection refused".to_string()))
    }
}

/// Model that returns a fixed reply and records every prompt it receives
pub struct ScriptedModel {
    reply: std::result::Result<String, String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.reply.clone().map_err(RcaError::InferenceFailure)
    }
}

/// Model that only answers once `parties` calls are in flight at the same time
pub struct RendezvousModel {
    barrier: Arc<Barrier>,
    reply: String,
}

impl RendezvousModel {
    pub fn new(parties: usize, reply: impl Into<String>) -> Self {
        Self {
            barrier: Arc::new(Barrier::new(parties)),
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ChatModel for RendezvousModel {
    fn model(&self) -> &str {
        "rendezvous"
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        self.barrier.wait().await;
        Ok(self.reply.clone())
    }
}

/// A well-formed model answer for the account-locked scenario
pub fn valid_model_reply() -> String {
    serde_json::json!({
        "summary": "User is locked out of their account.",
        "category": "Login Issue",
        "root_cause": "Account lockout after repeated failed sign-in attempts",
        "issue_type": "User error",
        "severity": "Medium",
        "confidence": 0.8,
        "engineering_actions": ["Audit lockout thresholds"],
        "product_actions": ["Show remaining attempts before lockout"],
        "support_reply_suggestion": "Verify identity and unlock the account.",
        "similar_incidents": ["MADE-UP-BY-MODEL"]
    })
    .to_string()
}
