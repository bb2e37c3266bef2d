use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::RcaError;
use crate::errors::Result;

/// Environment variable prefix for overrides, e.g. `RCA_LLM__MODEL`
pub const ENV_PREFIX: &str = "RCA";

/// Model name variable honoured for compatibility with plain Ollama setups
pub const OLLAMA_MODEL_ENV: &str = "OLLAMA_MODEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    /// "ollama" or "openai" (any OpenAI-compatible chat endpoint)
    pub provider: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            provider: "ollama".to_string(),
            api_key: None,
            model: default_model(),
            temperature: 0.0,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// Empty means "same endpoint as the LLM"
    pub endpoint: String,
    pub provider: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            provider: "ollama".to_string(),
            api_key: None,
            model: default_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub index_path: String,
    pub persist: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            index_path: "./index/incidents.json".to_string(),
            persist: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: String,
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: "logs".to_string(),
            file_output: true,
        }
    }
}

fn default_model() -> String {
    "llama3.2".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embeddings: EmbeddingsConfig,
    pub retrieval: RetrievalConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from defaults, the config file, `.env` and the environment
    ///
    /// Later sources win: defaults, `config.toml` (or `config.example.toml`),
    /// `RCA_*` variables, then `OLLAMA_MODEL`.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::load_from(Path::new("."), None)
    }

    /// Load with config files looked up in `dir`
    ///
    /// `env` replaces the process environment when given.
    pub(crate) fn load_from(dir: &Path, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();

        let primary = dir.join("config.toml");
        let example = dir.join("config.example.toml");
        if primary.exists() {
            builder = builder.add_source(config::File::from(primary));
        } else if example.exists() {
            eprintln!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            builder = builder.add_source(config::File::from(example));
        }

        let ollama_model = match &env {
            Some(vars) => vars.get(OLLAMA_MODEL_ENV).cloned(),
            None => std::env::var(OLLAMA_MODEL_ENV).ok(),
        };

        // RCA_LLM__MODEL -> llm.model
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_ollama_model(ollama_model);
        config.validate()?;
        Ok(config)
    }

    fn apply_ollama_model(&mut self, model: Option<String>) {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.llm.model.clone_from(&model);
            self.embeddings.model = model;
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(RcaError::ConfigError(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(RcaError::ConfigError("llm.model must not be empty".to_string()));
        }
        if self.embeddings.model.trim().is_empty() {
            return Err(RcaError::ConfigError(
                "embeddings.model must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(RcaError::ConfigError(format!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        self.llm.endpoint.trim_end_matches('/')
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.model
    }

    /// Get embedding endpoint, falling back to the LLM endpoint
    pub fn embedding_endpoint(&self) -> &str {
        if self.embeddings.endpoint.trim().is_empty() {
            self.llm_endpoint()
        } else {
            self.embeddings.endpoint.trim_end_matches('/')
        }
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Number of similar incidents retrieved per ticket
    pub const fn top_k(&self) -> usize {
        self.retrieval.top_k
    }

    /// Snapshot path of the similarity index, if persistence is enabled
    pub fn index_path(&self) -> Option<&Path> {
        self.retrieval
            .persist
            .then(|| Path::new(&self.retrieval.index_path))
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
impl AppConfig {
    pub(crate) fn with_ollama_model(mut self, model: Option<String>) -> Self {
        self.apply_ollama_model(model);
        self
    }
}
