//! Vector store trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, RetrievalResult};
use crate::error::Result;

/// A storage backend for chunk embeddings with exact top-K similarity search.
///
/// The store is the sole owner of the durable chunk set. All mutation goes
/// through [`upsert`](VectorStore::upsert) and [`delete`](VectorStore::delete),
/// both atomic per document id: a query concurrent with an upsert observes
/// either the fully-previous or fully-new chunk set for that document, never
/// a partial mix. Queries are read-only and never block each other.
///
/// The store is created for a fixed embedding dimension; any vector with a
/// different length is rejected with
/// [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch),
/// leaving the store unchanged.
///
/// # Example
///
/// ```rust,ignore
/// use corpusqa_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(384);
/// store.upsert("doc1", chunks).await?;
/// let results = store.query(&query_embedding, 3, 0.25).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The embedding dimension this store accepts.
    fn dimensions(&self) -> usize;

    /// Atomically replace all stored chunks for `document_id` with `chunks`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch)
    /// if any chunk embedding's length differs from [`dimensions`](VectorStore::dimensions);
    /// the previously stored chunk set is left intact.
    async fn upsert(&self, document_id: &str, chunks: Vec<Chunk>) -> Result<()>;

    /// Remove all chunks for `document_id`. Subsequent queries never return
    /// them. Removing an unknown document is a no-op.
    async fn delete(&self, document_id: &str) -> Result<()>;

    /// Return up to `top_k` chunks with cosine similarity `>= min_score`
    /// against `vector`, scanning every stored chunk across all documents.
    ///
    /// Results are ordered by descending score; ties are broken by ascending
    /// `(document_id, chunk_index)`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch)
    /// if `vector`'s length differs from [`dimensions`](VectorStore::dimensions).
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievalResult>>;
}
