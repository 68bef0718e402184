//! Data types for documents, chunks, and retrieval results.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A source document supplied by the caller.
///
/// Documents are immutable once ingested; re-ingesting under the same id
/// atomically replaces all stored chunks for that id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Caller-supplied unique identifier.
    pub id: String,
    /// The extracted plain text of the document.
    pub text: String,
}

impl Document {
    /// Create a document from an id and its extracted text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// A bounded contiguous slice of a document's text, the unit of embedding
/// and retrieval.
///
/// Chunk indices for a document are contiguous starting at 0 and match the
/// order the chunker produced them in. The embedding is empty until the
/// ingestion path attaches one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The id of the parent [`Document`].
    pub document_id: String,
    /// Zero-based ordinal of this chunk within its document.
    pub chunk_index: usize,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with its similarity score.
///
/// Result sequences are ordered by [`ranking_cmp`](RetrievalResult::ranking_cmp):
/// descending score, ties broken by ascending `(document_id, chunk_index)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query vector (higher is more relevant).
    pub score: f32,
}

impl RetrievalResult {
    /// Total order used for ranking: descending score, then ascending
    /// `(document_id, chunk_index)` so equal scores rank deterministically.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.chunk.document_id.cmp(&other.chunk.document_id))
            .then_with(|| self.chunk.chunk_index.cmp(&other.chunk.chunk_index))
    }
}
