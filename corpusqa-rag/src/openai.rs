//! OpenAI-compatible embedding and chat-completion clients.
//!
//! This module is only available when the `openai` feature is enabled.
//! Both clients speak the OpenAI wire format over `reqwest`, carry a
//! bounded per-request timeout, and classify 429/5xx/transport failures as
//! transient so the shared [`RetryPolicy`] can back off and retry per call.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generator::CompletionModel;
use crate::retry::RetryPolicy;

/// The default OpenAI embeddings API endpoint.
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// The default OpenAI chat completions API endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The default model for OpenAI embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// The default chat model for answer generation.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// The default number of texts sent per embeddings request.
const DEFAULT_BATCH_SIZE: usize = 64;

/// The default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Classify an HTTP status: rate limits and server errors are transient,
/// everything else is a caller problem and fails immediately.
fn transient_status(status: reqwest::StatusCode) -> bool {
    status.as_u16() == 429 || status.is_server_error()
}

/// Map a transport-level error (connect, timeout, body read) to a transient
/// failure for the given service.
fn transport_error(service: &str, e: reqwest::Error) -> RagError {
    RagError::Transient { service: service.to_string(), message: format!("request failed: {e}") }
}

// ── OpenAI API wire types ──────────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Decode an error body into a readable message, falling back to raw text.
fn decode_error_body(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ── Embedding client ───────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by an OpenAI-compatible embeddings API.
///
/// Splits oversized inputs into requests of at most `batch_size` texts and
/// reassembles the per-batch results in input order. Every returned vector
/// is validated against the configured dimension; a mismatch fails the call
/// with [`RagError::EmbeddingDimension`] and is never retried. Transport
/// failures, rate limits, and 5xx responses are retried per batch via the
/// configured [`RetryPolicy`].
///
/// # Example
///
/// ```rust,ignore
/// use corpusqa_rag::OpenAIEmbeddingClient;
///
/// let client = OpenAIEmbeddingClient::new("sk-...")?
///     .with_model("text-embedding-3-large", 3072);
/// let embedding = client.embed("hello world").await?;
/// ```
pub struct OpenAIEmbeddingClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
    timeout: Duration,
    retry: RetryPolicy,
}

impl OpenAIEmbeddingClient {
    /// Create a new client with the given API key and default model
    /// (`text-embedding-3-small`, 1536 dimensions).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::EmbeddingError {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: OPENAI_EMBEDDINGS_URL.into(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a new client using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| RagError::EmbeddingError {
            provider: "OpenAI".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name and the dimension its vectors are expected to have.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set a custom endpoint for OpenAI-compatible APIs.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the maximum number of texts per embeddings request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy for transient failures.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Issue one embeddings request for a single batch and validate the
    /// dimensionality of every returned vector.
    async fn request_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request_body = EmbeddingRequest { model: &self.model, input: texts };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error("embedding", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = decode_error_body(&body);

            if transient_status(status) {
                return Err(RagError::Transient {
                    service: "embedding".into(),
                    message: format!("API returned {status}: {detail}"),
                });
            }
            error!(provider = "OpenAI", %status, "embeddings API error");
            return Err(RagError::EmbeddingError {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse embeddings response");
            RagError::EmbeddingError {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if embedding_response.data.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: "OpenAI".into(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    embedding_response.data.len(),
                    texts.len()
                ),
            });
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for data in embedding_response.data {
            if data.embedding.len() != self.dimensions {
                return Err(RagError::EmbeddingDimension {
                    provider: "OpenAI".into(),
                    expected: self.dimensions,
                    actual: data.embedding.len(),
                });
            }
            vectors.push(data.embedding);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::EmbeddingError {
            provider: "OpenAI".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "OpenAI",
            input_count = texts.len(),
            batch_size = self.batch_size,
            model = %self.model,
            "embedding batch"
        );

        // Retries are per batch, not per item, to bound cost on flaky
        // connections.
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let batch_vectors =
                self.retry.run("embedding", || self.request_batch(batch)).await?;
            vectors.extend(batch_vectors);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat completion client ─────────────────────────────────────────

/// A [`CompletionModel`] backed by an OpenAI-compatible chat completions API.
///
/// Sends the assembled prompt as a single user message. Transport failures,
/// rate limits, and 5xx responses are retried via the configured
/// [`RetryPolicy`]; exhaustion surfaces as
/// [`RagError::ServiceUnavailable`] with service `"completion"`, which the
/// boundary layer should present as a retry-later condition.
///
/// # Example
///
/// ```rust,ignore
/// use corpusqa_rag::OpenAIChatModel;
///
/// let model = OpenAIChatModel::new("sk-...")?.with_model("gpt-4o");
/// let answer = model.complete("...prompt...").await?;
/// ```
pub struct OpenAIChatModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl OpenAIChatModel {
    /// Create a new client with the given API key and the default chat model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::CompletionError {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: OPENAI_CHAT_URL.into(),
            api_key,
            model: DEFAULT_CHAT_MODEL.into(),
            temperature: 0.2,
            max_tokens: Some(512),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a new client using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| RagError::CompletionError {
            provider: "OpenAI".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `gpt-4o`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom endpoint for OpenAI-compatible APIs.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy for transient failures.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request_completion(&self, prompt: &str) -> Result<String> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error("completion", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = decode_error_body(&body);

            if transient_status(status) {
                return Err(RagError::Transient {
                    service: "completion".into(),
                    message: format!("API returned {status}: {detail}"),
                });
            }
            error!(provider = "OpenAI", %status, "chat API error");
            return Err(RagError::CompletionError {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse chat response");
            RagError::CompletionError {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RagError::CompletionError {
                provider: "OpenAI".into(),
                message: "API returned no completion choices".into(),
            })
    }
}

#[async_trait]
impl CompletionModel for OpenAIChatModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(provider = "OpenAI", model = %self.model, prompt_len = prompt.len(), "completing");
        self.retry.run("completion", || self.request_completion(prompt)).await
    }
}
