//! Embeddings generation module
//!
//! The similarity index only depends on the [`Embedder`] trait; the HTTP
//! [`EmbeddingClient`] implements it for two providers:
//! - Ollama (local models)
//! - `OpenAI`-compatible endpoints
//!
//! # Examples
//!
//! ```rust,no_run
//! use rootcause::config::AppConfig;
//! use rootcause::embeddings::{EmbeddingClient, EmbeddingConfig, Embedder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::from_config(EmbeddingConfig::from_app_config(&config)?)?;
//!
//!     let embedding = client.embed("Payments failing for EU customers").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

use async_trait::async_trait;
pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;

use crate::errors::Result;

/// Maximum number of concurrent requests for providers without batch support
pub const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Turns text into vectors for similarity ranking
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier; vectors from different models are not comparable
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        Ok(Self {
            provider: EmbeddingProvider::from_name(&config.embeddings.provider)?,
            model: config.embedding_model().to_string(),
            endpoint: config.embedding_endpoint().to_string(),
            api_key: config
                .embeddings
                .api_key
                .clone()
                .or_else(|| config.llm.api_key.clone()),
        })
    }
}
