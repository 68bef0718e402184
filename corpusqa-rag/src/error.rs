//! Error types for the `corpusqa-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval-augmented generation operations.
///
/// Variants fall into four classes with distinct handling: input errors
/// ([`EmptyDocument`](RagError::EmptyDocument),
/// [`EmptyQuestion`](RagError::EmptyQuestion)) are rejected immediately and
/// never retried; consistency errors
/// ([`EmbeddingDimension`](RagError::EmbeddingDimension),
/// [`DimensionMismatch`](RagError::DimensionMismatch)) are fatal for the
/// operation and never coerced; transient infrastructure errors
/// ([`Transient`](RagError::Transient)) are retried by the
/// [`RetryPolicy`](crate::RetryPolicy) and converted to
/// [`ServiceUnavailable`](RagError::ServiceUnavailable) on exhaustion; all
/// remaining variants propagate as-is.
#[derive(Debug, Error)]
pub enum RagError {
    /// A document contained no text after whitespace normalization.
    #[error("document '{document_id}' is empty after whitespace normalization")]
    EmptyDocument {
        /// The id of the rejected document.
        document_id: String,
    },

    /// A query question contained no text.
    #[error("question is empty")]
    EmptyQuestion,

    /// An embedding service returned a vector of the wrong dimension.
    ///
    /// Indicates a model or configuration error, not a transient fault,
    /// so the call is never retried.
    #[error("embedding dimension mismatch ({provider}): expected {expected}, got {actual}")]
    EmbeddingDimension {
        /// The embedding provider that produced the vector.
        provider: String,
        /// The dimension the provider is configured for.
        expected: usize,
        /// The dimension actually returned.
        actual: usize,
    },

    /// A vector presented to the store has the wrong dimension.
    ///
    /// Raised for both upserted embeddings and query vectors; the store is
    /// left unchanged.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the store was created with.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },

    /// An external service kept failing transiently until the retry budget
    /// was exhausted. Recoverable: the caller may retry later.
    #[error("{service} service unavailable after {attempts} attempts: {message}")]
    ServiceUnavailable {
        /// Which external service was unavailable ("embedding", "completion", ...).
        service: String,
        /// How many attempts were made before giving up.
        attempts: u32,
        /// The last underlying failure.
        message: String,
    },

    /// A transient external-service failure (timeout, rate limit, 5xx).
    ///
    /// Produced by clients for the retry path; never escapes a
    /// [`RetryPolicy::run`](crate::RetryPolicy::run) call, which converts
    /// the final occurrence into [`ServiceUnavailable`](RagError::ServiceUnavailable).
    #[error("transient {service} failure: {message}")]
    Transient {
        /// Which external service failed.
        service: String,
        /// A description of the failure.
        message: String,
    },

    /// A non-retryable error from an embedding provider.
    #[error("embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A non-retryable error from a completion model.
    #[error("completion error ({provider}): {message}")]
    CompletionError {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in the vector store backend.
    #[error("vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// An error in the pipeline orchestration.
    #[error("pipeline error: {0}")]
    PipelineError(String),
}

impl RagError {
    /// Whether this error should be retried with backoff.
    ///
    /// Only [`Transient`](RagError::Transient) qualifies; everything else
    /// propagates immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
