//! Qdrant vector store backend.
//!
//! This module is only available when the `qdrant` feature is enabled.
//! Provides [`QdrantVectorStore`], a persistent [`VectorStore`] over the
//! [qdrant-client](https://docs.rs/qdrant-client) gRPC API.
//!
//! Per-document replace runs in two phases: the new chunks overwrite their
//! stable point ids, then stale points of the same document with indices
//! past the new chunk count are deleted. A reader concurrent with the
//! replace may briefly observe the transition; the strict single-swap
//! atomicity contract is the reference [`InMemoryVectorStore`] store's.
//!
//! Qdrant searches its HNSW graph, so top-K results are approximate and may
//! diverge from the exact scan of the in-memory store on adversarial
//! corpora. At the corpus sizes this crate targets the ranked top-K is the
//! same in practice.
//!
//! [`InMemoryVectorStore`]: crate::InMemoryVectorStore
//!
//! # Example
//!
//! ```rust,ignore
//! use corpusqa_rag::qdrant::QdrantVectorStore;
//!
//! let store = QdrantVectorStore::connect("http://localhost:6334", "corpus", 1536).await?;
//! store.upsert("doc1", chunks).await?;
//! let results = store.query(&query_embedding, 3, 0.25).await?;
//! ```

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct, Range,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;
use uuid::Uuid;

use crate::document::{Chunk, RetrievalResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// A persistent [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// All chunks live in one collection created with cosine distance; chunk
/// text and position are stored as point payload. Point ids are derived
/// deterministically from `(document_id, chunk_index)` so re-ingesting a
/// document overwrites its existing points in place.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimensions: usize,
}

impl QdrantVectorStore {
    /// Connect to a Qdrant instance and ensure `collection` exists with the
    /// given embedding dimension and cosine distance.
    pub async fn connect(url: &str, collection: &str, dimensions: usize) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        let store = Self { client, collection: collection.to_string(), dimensions };
        store.ensure_collection().await?;
        Ok(store)
    }

    /// Build a store from an existing client. The collection is created if
    /// it does not exist yet.
    pub async fn from_client(
        client: Qdrant,
        collection: &str,
        dimensions: usize,
    ) -> Result<Self> {
        let store = Self { client, collection: collection.to_string(), dimensions };
        store.ensure_collection().await?;
        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        let exists = collections.collections.iter().any(|c| c.name == self.collection);
        if exists {
            debug!(collection = %self.collection, "qdrant collection already exists");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimensions as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, dimensions = self.dimensions, "created qdrant collection");
        Ok(())
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorStoreError { backend: "qdrant".to_string(), message: e.to_string() }
    }

    /// Stable point id for a chunk, derived from its document id and index.
    fn point_id(document_id: &str, chunk_index: usize) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{document_id}:{chunk_index}").as_bytes())
            .to_string()
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Extract an integer from a Qdrant payload value.
    fn extract_integer(value: &QdrantValue) -> Option<i64> {
        match &value.kind {
            Some(Kind::IntegerValue(n)) => Some(*n),
            _ => None,
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn upsert(&self, document_id: &str, chunks: Vec<Chunk>) -> Result<()> {
        for chunk in &chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: chunk.embedding.len(),
                });
            }
        }

        let new_count = chunks.len();
        let points: Vec<PointStruct> = chunks
            .into_iter()
            .map(|chunk| {
                let mut payload_map = serde_json::Map::new();
                payload_map.insert("text".to_string(), serde_json::Value::String(chunk.text));
                payload_map.insert(
                    "document_id".to_string(),
                    serde_json::Value::String(chunk.document_id.clone()),
                );
                payload_map.insert(
                    "chunk_index".to_string(),
                    serde_json::Value::Number(chunk.chunk_index.into()),
                );
                let payload =
                    Payload::try_from(serde_json::Value::Object(payload_map)).unwrap_or_default();

                PointStruct::new(
                    Self::point_id(&chunk.document_id, chunk.chunk_index),
                    chunk.embedding,
                    payload,
                )
            })
            .collect();

        if !points.is_empty() {
            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
                .await
                .map_err(Self::map_err)?;
        }

        // Drop points left over from a previous, longer version of this
        // document.
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(Filter::must([
                        Condition::matches("document_id", document_id.to_string()),
                        Condition::range(
                            "chunk_index",
                            Range { gte: Some(new_count as f64), ..Default::default() },
                        ),
                    ]))
                    .wait(true),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, document_id, count = new_count, "upserted chunks to qdrant");
        Ok(())
    }

    async fn delete(&self, document_id: &str) -> Result<()> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(Filter::must([Condition::matches(
                        "document_id",
                        document_id.to_string(),
                    )]))
                    .wait(true),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, document_id, "deleted document from qdrant");
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

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.to_vec(), top_k as u64)
                    .score_threshold(min_score)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let mut results: Vec<RetrievalResult> = response
            .result
            .into_iter()
            .map(|scored| {
                let text =
                    scored.payload.get("text").and_then(Self::extract_string).unwrap_or_default();
                let document_id = scored
                    .payload
                    .get("document_id")
                    .and_then(Self::extract_string)
                    .unwrap_or_default();
                let chunk_index = scored
                    .payload
                    .get("chunk_index")
                    .and_then(Self::extract_integer)
                    .unwrap_or_default() as usize;

                RetrievalResult {
                    chunk: Chunk { document_id, chunk_index, text, embedding: Vec::new() },
                    score: scored.score,
                }
            })
            .collect();

        // Qdrant orders by score alone; enforce the deterministic tie-break.
        results.sort_by(RetrievalResult::ranking_cmp);
        Ok(results)
    }
}
