//! Ticket analysis pipeline: Retrieve -> Prompt -> Infer -> Parse -> Validate

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::info_span;
use tracing::warn;
use tracing::Instrument;

use crate::errors::RcaError;
use crate::errors::Result;
use crate::llm::ChatModel;
use crate::models::RootCauseAnalysis;
use crate::rag::parser::extract_json_object;
use crate::rag::PromptBuilder;
use crate::rag::RetrievalResult;
use crate::rag::SimilarityIndex;

/// Stages a single analysis request moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Retrieving,
    Prompting,
    Inferring,
    Parsing,
    Validating,
    Succeeded,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "RECEIVED",
            Self::Retrieving => "RETRIEVING",
            Self::Prompting => "PROMPTING",
            Self::Inferring => "INFERRING",
            Self::Parsing => "PARSING",
            Self::Validating => "VALIDATING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Retrieval-augmented root cause analysis
///
/// One instance is shared by all requests. The only shared state is the
/// similarity index, which is read-only once bootstrapped.
pub struct AnalysisPipeline {
    index: Arc<SimilarityIndex>,
    prompt_builder: PromptBuilder,
    model: Arc<dyn ChatModel>,
    top_k: usize,
}

impl AnalysisPipeline {
    pub fn new(index: Arc<SimilarityIndex>, model: Arc<dyn ChatModel>, top_k: usize) -> Self {
        Self {
            index,
            prompt_builder: PromptBuilder::new(),
            model,
            top_k,
        }
    }

    #[must_use]
    pub fn index(&self) -> &Arc<SimilarityIndex> {
        &self.index
    }

    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Analyze one ticket
    ///
    /// An unavailable index degrades to an empty context. Inference, parse
    /// and validation failures are returned to the caller unchanged.
    ///
    /// # Errors
    /// - `InferenceFailure` when the model service fails or times out
    /// - `ParseFailure` when the completion is not a JSON object
    /// - `ValidationFailure` naming the first field that breaks the schema
    pub async fn analyze(&self, ticket: &str) -> Result<RootCauseAnalysis> {
        let span = info_span!("analyze_ticket", ticket_len = ticket.len());
        async move {
            debug!("Stage {}", PipelineStage::Received);
            let result = self.run(ticket).await;
            match &result {
                Ok(_) => debug!("Stage {}", PipelineStage::Succeeded),
                Err(e) => warn!("Stage {}: {}", PipelineStage::Failed, e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, ticket: &str) -> Result<RootCauseAnalysis> {
        debug!("Stage {}", PipelineStage::Retrieving);
        let retrieval = self.retrieve(ticket).await;
        let identifiers = retrieval.identifiers();
        info!(
            "Found {} similar incidents: {:?}",
            identifiers.len(),
            identifiers
        );

        debug!("Stage {}", PipelineStage::Prompting);
        let prompt = self
            .prompt_builder
            .build(ticket, &retrieval.joined_content())?;

        debug!("Stage {}", PipelineStage::Inferring);
        let completion = self.model.complete(&prompt.messages()).await?;

        debug!("Stage {}", PipelineStage::Parsing);
        let value = extract_json_object(&completion)?;

        debug!("Stage {}", PipelineStage::Validating);
        let analysis = RootCauseAnalysis::from_value(&value)?;

        Ok(analysis.with_similar_incidents(identifiers))
    }

    async fn retrieve(&self, ticket: &str) -> RetrievalResult {
        match self.index.query(ticket, self.top_k).await {
            Ok(result) => result,
            Err(RcaError::RetrievalUnavailable(reason)) => {
                warn!(
                    "Similarity index unavailable, continuing without context: {}",
                    reason
                );
                RetrievalResult::empty()
            }
            Err(e) => {
                warn!("Retrieval failed, continuing without context: {}", e);
                RetrievalResult::empty()
            }
        }
    }
}
