//! Query-side retrieval: embed the question, search the store.

use std::sync::Arc;

use tracing::{debug, info};

use crate::document::RetrievalResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Embeds a question and retrieves the best-matching chunks from a
/// [`VectorStore`].
///
/// `top_k` is clamped to the `top_k_limit` ceiling before the store is
/// queried, so callers may request fewer results but never more. An empty
/// result is a valid outcome, not an error: it means the corpus holds no
/// grounding for the question and the caller must say so rather than let
/// the model fabricate an answer.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    top_k_limit: usize,
}

impl Retriever {
    /// Create a retriever over the given provider and store.
    ///
    /// `top_k_limit` is the hard ceiling on results per query; a value of 0
    /// is treated as 1.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        top_k_limit: usize,
    ) -> Self {
        Self { embedder, store, top_k_limit: top_k_limit.max(1) }
    }

    /// Retrieve up to `top_k` chunks scoring at least `min_score` against
    /// the question.
    ///
    /// The question is embedded as a single-item batch, then the store is
    /// queried with the clamped `top_k`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyQuestion`] for a whitespace-only question;
    /// embedding and store failures propagate with their own classification.
    pub async fn retrieve(
        &self,
        question: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievalResult>> {
        if question.trim().is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        let embeddings = self.embedder.embed_batch(&[question]).await?;
        let query_vector = embeddings.into_iter().next().ok_or_else(|| {
            RagError::PipelineError("embedding provider returned no vector for question".into())
        })?;

        let clamped = top_k.min(self.top_k_limit);
        if clamped < top_k {
            debug!(requested = top_k, clamped, "top_k clamped to ceiling");
        }

        let results = self.store.query(&query_vector, clamped, min_score).await?;
        info!(result_count = results.len(), top_k = clamped, min_score, "retrieval completed");
        Ok(results)
    }
}
