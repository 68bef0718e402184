//! # corpusqa-rag
//!
//! Retrieval-augmented question answering over a caller-supplied document
//! corpus: answers are generated only from ingested text and returned
//! together with the exact passages they relied on.
//!
//! ## Overview
//!
//! The crate is a pipeline of small components behind trait seams:
//!
//! - [`Chunker`] splits extracted document text into overlapping,
//!   bounded-size chunks ([`SlidingWindowChunker`], [`SentenceChunker`])
//! - [`EmbeddingProvider`] turns chunk and question text into
//!   fixed-dimension vectors, with batching and per-batch retry
//! - [`VectorStore`] owns the durable chunks and answers exact top-K cosine
//!   queries ([`InMemoryVectorStore`]; persistent Qdrant backend behind the
//!   `qdrant` feature)
//! - [`Retriever`] embeds a question and queries the store under the top-K
//!   ceiling and score threshold
//! - [`PromptAssembler`] builds a bounded, citation-preserving grounding
//!   prompt
//! - [`AnswerGenerator`] sends the prompt to a [`CompletionModel`] and
//!   packages the answer with its [`Source`]s
//!
//! [`RagPipeline`] wires them together: ingestion runs chunk → embed →
//! upsert, answering runs retrieve → assemble → generate.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use corpusqa_rag::{
//!     Document, InMemoryVectorStore, OpenAIChatModel, OpenAIEmbeddingClient, RagConfig,
//!     RagPipeline, SlidingWindowChunker,
//! };
//!
//! let config = RagConfig::default();
//! let embedder = Arc::new(OpenAIEmbeddingClient::from_env()?);
//! let pipeline = RagPipeline::builder()
//!     .config(config.clone())
//!     .chunker(Arc::new(SlidingWindowChunker::new(config.chunk_size, config.chunk_overlap)?))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(embedder.dimensions())))
//!     .embedding_provider(embedder)
//!     .completion_model(Arc::new(OpenAIChatModel::from_env()?))
//!     .build()?;
//!
//! pipeline.ingest(&Document::new("doc1", text)).await?;
//! let grounded = pipeline.answer("What is the notice period?").await?;
//! println!("{}", grounded.answer);
//! for source in &grounded.sources {
//!     println!("  [{}] {:.2}", source.document_id, source.score);
//! }
//! ```
//!
//! ## Concurrency and cancellation
//!
//! Each ingestion and each query is an independent unit of work. The vector
//! store is the only shared mutable state; its `upsert`/`delete` are atomic
//! per document id, so a query concurrent with an upsert observes either the
//! fully-previous or fully-new chunk set for that document. Queries never
//! block each other.
//!
//! The only suspension points are the external-service awaits (embedding,
//! store I/O, completion). Dropping a query future at any of them has no
//! side effect; dropping an ingestion future leaves either the old or the
//! new chunk set in the in-memory store, never a mix.
//!
//! ## Feature flags
//!
//! - `openai` — [`OpenAIEmbeddingClient`] and [`OpenAIChatModel`] over any
//!   OpenAI-compatible API (enables `reqwest`)
//! - `qdrant` — persistent `QdrantVectorStore` backend
//!
//! [`OpenAIEmbeddingClient`]: crate::openai::OpenAIEmbeddingClient
//! [`OpenAIChatModel`]: crate::openai::OpenAIChatModel

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generator;
pub mod inmemory;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod retry;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use chunking::{Chunker, SentenceChunker, SlidingWindowChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, RetrievalResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generator::{AnswerGenerator, CompletionModel, GroundedAnswer, Source};
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{IngestSummary, RagPipeline, RagPipelineBuilder};
pub use prompt::{AssembledPrompt, PromptAssembler};
pub use retriever::Retriever;
pub use retry::RetryPolicy;
pub use vectorstore::VectorStore;

#[cfg(feature = "openai")]
pub use openai::{OpenAIChatModel, OpenAIEmbeddingClient};
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
