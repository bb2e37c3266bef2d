//! HTTP chat client with timeout and bounded retry

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::ChatMessage;
use super::ChatModel;
use crate::config::AppConfig;
use crate::errors::RcaError;
use crate::errors::Result;

/// Supported chat providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Ollama `/api/chat`
    Ollama,
    /// `OpenAI`-compatible `/chat/completions`
    OpenAI,
}

impl LlmProvider {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            other => Err(RcaError::ConfigError(format!(
                "Unknown LLM provider '{other}' (expected 'ollama' or 'openai')"
            ))),
        }
    }
}

/// Failure of a single attempt
struct AttemptError {
    message: String,
    retryable: bool,
}

impl AttemptError {
    fn transient(message: String) -> Self {
        Self {
            message,
            retryable: true,
        }
    }

    fn permanent(message: String) -> Self {
        Self {
            message,
            retryable: false,
        }
    }
}

/// Chat completion client
#[derive(Debug, Clone)]
pub struct LlmService {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    timeout: Duration,
    max_retries: u32,
    retry_interval: Duration,
    client: Client,
}

impl LlmService {
    /// Create a new LLM service from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_settings(
            LlmProvider::from_name(&config.llm.provider)?,
            config.llm_endpoint(),
            config.llm_model(),
            config.llm.api_key.clone(),
            config.llm.temperature,
            Duration::from_secs(config.llm.timeout_secs),
            config.llm.max_retries,
        )
    }

    pub fn with_settings(
        provider: LlmProvider,
        endpoint: &str,
        model: &str,
        api_key: Option<String>,
        temperature: f32,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RcaError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            temperature,
            timeout,
            max_retries,
            retry_interval: Duration::from_millis(500),
            client,
        })
    }

    /// Override the first backoff interval
    #[must_use]
    pub const fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.retry_interval,
            initial_interval: self.retry_interval,
            max_interval: Duration::from_secs(10),
            multiplier: 2.0,
            randomization_factor: 0.2,
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }

    async fn attempt(&self, messages: &[ChatMessage]) -> std::result::Result<String, AttemptError> {
        match self.provider {
            LlmProvider::Ollama => self.chat_ollama(messages).await,
            LlmProvider::OpenAI => self.chat_openai(messages).await,
        }
    }

    async fn post<B: Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
    ) -> std::result::Result<reqwest::Response, AttemptError> {
        let mut request = self.client.post(url).timeout(self.timeout).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::transient(format!(
                    "model call timed out after {}s",
                    self.timeout.as_secs()
                ))
            } else {
                AttemptError::transient(format!("request to {url} failed: {e}"))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = format!("model service returned {status}: {error_text}");
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(AttemptError::transient(message))
        } else {
            Err(AttemptError::permanent(message))
        }
    }

    async fn chat_ollama(&self, messages: &[ChatMessage]) -> std::result::Result<String, AttemptError> {
        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
        }

        #[derive(Serialize)]
        struct OllamaChatRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            stream: bool,
            format: &'a str,
            options: OllamaOptions,
        }

        #[derive(Deserialize)]
        struct OllamaChatResponse {
            message: ChatMessage,
        }

        let url = format!("{}/api/chat", self.endpoint);
        debug!("Calling Ollama chat API: {}", url);

        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self.post(&url, &request).await?;
        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::permanent(format!("malformed chat response: {e}")))?;

        Ok(body.message.content)
    }

    async fn chat_openai(&self, messages: &[ChatMessage]) -> std::result::Result<String, AttemptError> {
        #[derive(Serialize)]
        struct ResponseFormat<'a> {
            #[serde(rename = "type")]
            kind: &'a str,
        }

        #[derive(Serialize)]
        struct OpenAIChatRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            temperature: f32,
            response_format: ResponseFormat<'a>,
        }

        #[derive(Deserialize)]
        struct OpenAIChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: Option<String>,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat API: {}", url);

        let request = OpenAIChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self.post(&url, &request).await?;
        let body: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::permanent(format!("malformed chat response: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AttemptError::permanent("chat response has no content".to_string()))
    }
}

#[async_trait]
impl ChatModel for LlmService {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut backoff = self.backoff();
        let mut attempts = 0;

        loop {
            match self.attempt(messages).await {
                Ok(content) => return Ok(content),
                Err(err) if err.retryable && attempts < self.max_retries => {
                    let delay = backoff.next_backoff().unwrap_or(self.retry_interval);
                    attempts += 1;
                    warn!(
                        "Model call failed, retrying in {:?} (attempt {}/{}): {}",
                        delay, attempts, self.max_retries, err.message
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    let message = if attempts > 0 {
                        format!("{} (after {} retries)", err.message, attempts)
                    } else {
                        err.message
                    };
                    return Err(RcaError::InferenceFailure(message));
                }
            }
        }
    }
}
