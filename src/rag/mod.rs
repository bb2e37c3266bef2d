//! RAG (Retrieval-Augmented Generation) module
//!
//! Turns a free-text support ticket into a validated [`RootCauseAnalysis`]:
//! - Similarity search over past incidents using vector embeddings
//! - Prompt assembly with the retrieved incidents as context
//! - A structured-output model call
//! - Strict parsing and schema validation of the completion
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rootcause::config::AppConfig;
//! use rootcause::embeddings::EmbeddingClient;
//! use rootcause::embeddings::EmbeddingConfig;
//! use rootcause::llm::LlmService;
//! use rootcause::rag::AnalysisPipeline;
//! use rootcause::rag::SimilarityIndex;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let embedder = Arc::new(EmbeddingClient::from_config(EmbeddingConfig::from_app_config(&config)?)?);
//!     let index = Arc::new(SimilarityIndex::new(embedder));
//!     rootcause::rag::bootstrap(&index).await?;
//!
//!     let model = Arc::new(LlmService::new(&config)?);
//!     let pipeline = AnalysisPipeline::new(index, model, config.top_k());
//!
//!     let analysis = pipeline.analyze("Payments failing again!!!").await?;
//!     println!("Root cause: {}", analysis.root_cause);
//!     println!("Similar: {:?}", analysis.similar_incidents);
//!
//!     Ok(())
//! }
//! ```
//!
//! [`RootCauseAnalysis`]: crate::models::RootCauseAnalysis

pub mod index;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod seed;

pub use index::RetrievalResult;
pub use index::RetrievedIncident;
pub use index::SimilarityIndex;
pub use parser::parse_analysis;
pub use pipeline::AnalysisPipeline;
pub use pipeline::PipelineStage;
pub use prompts::PromptBuilder;
pub use prompts::PromptPayload;
pub use seed::bootstrap;
pub use seed::seed_corpus;
