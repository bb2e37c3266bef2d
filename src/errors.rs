use thiserror::Error;

#[derive(Error, Debug)]
pub enum RcaError {
    /// Embedding or index service could not serve a similarity query
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Model service unreachable, returned an error status, or timed out
    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    /// Model output is not well-formed structured data
    #[error("Failed to parse model output: {reason}")]
    ParseFailure { reason: String, raw: String },

    /// Structured output violates a field constraint
    #[error("Validation failed for field '{field}': {constraint}")]
    ValidationFailure {
        field: &'static str,
        constraint: String,
    },

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Config loading error: {0}")]
    Config(#[from] config::ConfigError),
}

impl RcaError {
    pub fn validation(field: &'static str, constraint: impl Into<String>) -> Self {
        Self::ValidationFailure {
            field,
            constraint: constraint.into(),
        }
    }

    pub fn parse(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ParseFailure {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Raw model text attached to a parse failure
    #[must_use]
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::ParseFailure { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Whether the failure originated in the model's answer rather than transport
    #[must_use]
    pub const fn is_model_output_error(&self) -> bool {
        matches!(
            self,
            Self::ParseFailure { .. } | Self::ValidationFailure { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RcaError>;
