//! In-memory vector store using exact cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency store
//! backed by a `HashMap` keyed by document id and protected by a
//! `tokio::sync::RwLock`. It is the reference implementation of the
//! [`VectorStore`] atomicity contract: the whole chunk set for a document is
//! swapped in a single write-lock section, so readers see either the old or
//! the new set, never a mix.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, RetrievalResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// An in-memory [`VectorStore`] with exact nearest-neighbor semantics.
///
/// Each document's chunks are held as one immutable `Arc<[Chunk]>` slab;
/// upsert replaces the slab, delete drops it. Queries scan every chunk of
/// every document under a read lock.
///
/// # Example
///
/// ```rust,ignore
/// use corpusqa_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(384);
/// store.upsert("doc1", chunks).await?;
/// ```
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimensions: usize,
    documents: RwLock<HashMap<String, Arc<[Chunk]>>>,
}

impl InMemoryVectorStore {
    /// Create an empty store accepting embeddings of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, documents: RwLock::new(HashMap::new()) }
    }

    /// Number of chunks currently stored across all documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.values().map(|chunks| chunks.len()).sum()
    }

    /// Whether the store holds no chunks.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Compute cosine similarity between two vectors of equal length.
///
/// Defined as the dot product of the L2-normalized vectors, range [-1, 1].
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn upsert(&self, document_id: &str, chunks: Vec<Chunk>) -> Result<()> {
        // Validate before taking the lock so a rejected upsert leaves the
        // store untouched.
        for chunk in &chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: chunk.embedding.len(),
                });
            }
        }

        let slab: Arc<[Chunk]> = chunks.into();
        let mut documents = self.documents.write().await;
        documents.insert(document_id.to_string(), slab);
        Ok(())
    }

    async fn delete(&self, document_id: &str) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.remove(document_id);
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievalResult>> {
        if vector.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }

        let documents = self.documents.read().await;
        let mut scored: Vec<RetrievalResult> = documents
            .values()
            .flat_map(|chunks| chunks.iter())
            .map(|chunk| RetrievalResult {
                score: cosine_similarity(&chunk.embedding, vector),
                chunk: chunk.clone(),
            })
            .filter(|result| result.score >= min_score)
            .collect();

        scored.sort_by(RetrievalResult::ranking_cmp);
        scored.truncate(top_k);
        Ok(scored)
    }
}
