//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results requested per query.
    pub top_k: usize,
    /// Hard ceiling on results per query; `top_k` is clamped to this at
    /// retrieval time to bound prompt size and cost.
    pub top_k_limit: usize,
    /// Minimum similarity score for retrieved results (results below this
    /// are filtered out).
    pub min_score: f32,
    /// Context budget for prompt assembly, in characters of chunk text.
    pub max_context_size: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 100,
            top_k: 3,
            top_k_limit: 3,
            min_score: 0.25,
            max_context_size: 4_000,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results requested per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the hard ceiling on results per query.
    pub fn top_k_limit(mut self, limit: usize) -> Self {
        self.config.top_k_limit = limit;
        self
    }

    /// Set the minimum similarity score for retrieved results.
    pub fn min_score(mut self, min_score: f32) -> Self {
        self.config.min_score = min_score;
        self
    }

    /// Set the context budget for prompt assembly, in characters.
    pub fn max_context_size(mut self, size: usize) -> Self {
        self.config.max_context_size = size;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0` or `top_k_limit == 0`
    /// - `max_context_size == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.top_k_limit == 0 {
            return Err(RagError::ConfigError("top_k_limit must be greater than zero".to_string()));
        }
        if self.config.max_context_size == 0 {
            return Err(RagError::ConfigError(
                "max_context_size must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
