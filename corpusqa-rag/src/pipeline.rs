//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the full ingest-and-answer workflow by
//! composing a [`Chunker`], an [`EmbeddingProvider`], a [`VectorStore`],
//! and a [`CompletionModel`].
//!
//! # Example
//!
//! ```rust,ignore
//! use corpusqa_rag::{RagPipeline, RagConfig, InMemoryVectorStore, SlidingWindowChunker};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .chunker(Arc::new(SlidingWindowChunker::new(512, 100)?))
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(1536)))
//!     .completion_model(Arc::new(my_model))
//!     .build()?;
//!
//! pipeline.ingest(&document).await?;
//! let grounded = pipeline.answer("What does the contract say about notice periods?").await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generator::{AnswerGenerator, CompletionModel, GroundedAnswer};
use crate::prompt::PromptAssembler;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// Summary returned after a successful document ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestSummary {
    /// The id of the ingested document.
    pub document_id: String,
    /// How many chunks were stored for it.
    pub chunk_count: usize,
}

/// The RAG pipeline orchestrator.
///
/// Ingestion runs chunk → embed → upsert; answering runs retrieve →
/// assemble → generate. Each request is an independent unit of work: the
/// only shared mutable state is the vector store, whose per-document
/// atomicity keeps concurrent ingestions and queries consistent. All
/// suspension points are the external-service awaits, so dropping either
/// future cancels the operation without leaving partial state behind.
///
/// Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    retriever: Retriever,
    assembler: PromptAssembler,
    generator: AnswerGenerator,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Ingest a single document: chunk → embed → atomically upsert.
    ///
    /// Re-ingesting an existing document id replaces all of its stored
    /// chunks as one unit.
    ///
    /// # Errors
    ///
    /// Propagates the classified failure of the step that failed:
    /// [`RagError::EmptyDocument`] from chunking,
    /// [`RagError::EmbeddingDimension`] / [`RagError::ServiceUnavailable`]
    /// from embedding, [`RagError::DimensionMismatch`] from the store. The
    /// failing document id is logged at the failure edge.
    pub async fn ingest(&self, document: &Document) -> Result<IngestSummary> {
        // 1. Chunk the document
        let mut chunks = self.chunker.chunk(document).inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "chunking failed during ingestion");
        })?;

        // 2. Embed all chunk texts, order-preserving
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
        })?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::PipelineError(format!(
                "embedding provider returned {} vectors for {} chunks of document '{}'",
                embeddings.len(),
                chunks.len(),
                document.id
            )));
        }

        // 3. Attach embeddings to chunks
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        // 4. Atomically replace the document's chunk set
        let chunk_count = chunks.len();
        self.store.upsert(&document.id, chunks).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during ingestion");
        })?;

        info!(document.id = %document.id, chunk_count, "ingested document");
        Ok(IngestSummary { document_id: document.id.clone(), chunk_count })
    }

    /// Remove a document and all of its chunks from the store.
    pub async fn delete(&self, document_id: &str) -> Result<()> {
        self.store.delete(document_id).await?;
        info!(document.id = %document_id, "deleted document");
        Ok(())
    }

    /// Answer a question from the ingested corpus: retrieve → assemble →
    /// generate.
    ///
    /// Zero retrieval results is not an error: the assembled prompt then
    /// instructs the model to state that no relevant information was found,
    /// and the returned answer carries no sources.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyQuestion`] for a whitespace-only question;
    /// embedding, search, and completion failures propagate with their own
    /// classification ([`RagError::ServiceUnavailable`] is recoverable and
    /// worth retrying later).
    pub async fn answer(&self, question: &str) -> Result<GroundedAnswer> {
        // 1. Retrieve grounding chunks
        let results =
            self.retriever.retrieve(question, self.config.top_k, self.config.min_score).await?;

        // 2. Assemble the bounded, citation-preserving prompt
        let prompt = self.assembler.assemble(question, &results);

        // 3. Generate and package with sources
        let grounded = self.generator.generate(&prompt).await.inspect_err(|e| {
            error!(error = %e, "generation failed");
        })?;

        info!(source_count = grounded.sources.len(), "answered question");
        Ok(grounded)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All components are required. Call [`build()`](RagPipelineBuilder::build)
/// to validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    model: Option<Arc<dyn CompletionModel>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the completion model used for answer generation.
    pub fn completion_model(mut self, model: Arc<dyn CompletionModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the [`RagPipeline`], validating that all required components
    /// are set and that the embedding provider and vector store agree on
    /// the embedding dimension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a component is missing or the
    /// dimensions disagree.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::ConfigError("chunker is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let model = self
            .model
            .ok_or_else(|| RagError::ConfigError("completion_model is required".to_string()))?;

        if embedder.dimensions() != store.dimensions() {
            return Err(RagError::ConfigError(format!(
                "embedding provider produces {}-dimension vectors but the vector store expects {}",
                embedder.dimensions(),
                store.dimensions()
            )));
        }

        let retriever = Retriever::new(embedder.clone(), store.clone(), config.top_k_limit);
        let assembler = PromptAssembler::new(config.max_context_size);
        let generator = AnswerGenerator::new(model);

        Ok(RagPipeline { config, chunker, embedder, store, retriever, assembler, generator })
    }
}
