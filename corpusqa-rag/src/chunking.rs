//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`SlidingWindowChunker`] — fixed-size character windows with exact overlap
//! - [`SentenceChunker`] — splits hierarchically by paragraphs, sentences, then words
//!
//! Both are pure functions of their input: chunking the same text with the
//! same parameters always yields the same boundaries and ordinals. Sizes and
//! overlaps are measured in Unicode scalar values, and slicing always lands
//! on char boundaries.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with contiguous zero-based indices and
/// no embeddings. Embeddings are attached later by the ingestion path.
pub trait Chunker: Send + Sync {
    /// Split a document into ordered chunks.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyDocument`] if the document text is empty
    /// after whitespace normalization.
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>>;
}

/// Normalize document text for chunking.
///
/// Leading and trailing whitespace carries no retrievable content; interior
/// whitespace is preserved so chunk offsets stay meaningful.
fn normalized(document: &Document) -> Result<&str> {
    let text = document.text.trim();
    if text.is_empty() {
        return Err(RagError::EmptyDocument { document_id: document.id.clone() });
    }
    Ok(text)
}

/// Splits text into fixed-size character windows with exact overlap.
///
/// Consecutive windows overlap by exactly `overlap` characters; the final
/// window may be shorter and carries no trailing overlap. A document shorter
/// than `chunk_size` yields exactly one chunk.
///
/// # Example
///
/// ```rust,ignore
/// use corpusqa_rag::SlidingWindowChunker;
///
/// let chunker = SlidingWindowChunker::new(400, 50)?;
/// let chunks = chunker.chunk(&document)?;
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    chunk_size: usize,
    overlap: usize,
}

impl SlidingWindowChunker {
    /// Create a new `SlidingWindowChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] unless `0 <= overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }
}

impl Chunker for SlidingWindowChunker {
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>> {
        let text = normalized(document)?;

        // Byte offset of every char, so windows measured in chars slice on
        // char boundaries.
        let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let char_count = offsets.len();
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        loop {
            let end = (start + self.chunk_size).min(char_count);
            let byte_start = offsets[start];
            let byte_end = if end == char_count { text.len() } else { offsets[end] };

            chunks.push(Chunk {
                document_id: document.id.clone(),
                chunk_index,
                text: text[byte_start..byte_end].to_string(),
                embedding: Vec::new(),
            });

            if end == char_count {
                break;
            }
            chunk_index += 1;
            start += step;
        }

        Ok(chunks)
    }
}

/// Splits text hierarchically: paragraphs → sentences → words.
///
/// First splits by paragraph separators (`\n\n`). If a paragraph exceeds
/// `chunk_size` characters, splits by sentence boundaries (`. `, `! `, `? `).
/// If a sentence still exceeds `chunk_size`, splits by word boundaries, and
/// as a last resort by fixed windows. Boundaries depend only on the input
/// text, so the output is stable across runs.
///
/// Unlike [`SlidingWindowChunker`], consecutive chunks are not guaranteed to
/// overlap by an exact amount; the overlap parameter only applies to the
/// fixed-window fallback.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    overlap: usize,
}

impl SentenceChunker {
    /// Create a new `SentenceChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] unless `0 <= overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }
}

/// Split text by a separator, then merge segments into chunks that respect
/// `chunk_size`. A segment that still exceeds `chunk_size` is split further
/// using the next-level separator.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if char_len(text) <= chunk_size || separators.is_empty() {
        return split_by_size(text, chunk_size, overlap);
    }

    let separator = separators[0];
    let remaining_separators = &separators[1..];

    let segments: Vec<&str> = if separator == " " {
        text.split_inclusive(' ').collect()
    } else {
        split_keeping_separator(text, separator)
    };

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for segment in segments {
        let segment_len = char_len(segment);
        if current.is_empty() {
            current = segment.to_string();
            current_len = segment_len;
        } else if current_len + segment_len <= chunk_size {
            current.push_str(segment);
            current_len += segment_len;
        } else {
            if current_len > chunk_size {
                chunks.extend(split_and_merge(&current, chunk_size, overlap, remaining_separators));
            } else {
                chunks.push(current);
            }
            current = segment.to_string();
            current_len = segment_len;
        }
    }

    if !current.is_empty() {
        if current_len > chunk_size {
            chunks.extend(split_and_merge(&current, chunk_size, overlap, remaining_separators));
        } else {
            chunks.push(current);
        }
    }

    chunks
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Fixed-window fallback splitting with overlap, on char boundaries.
fn split_by_size(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_count = offsets.len();
    let step = (chunk_size - overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(char_count);
        let byte_start = offsets[start];
        let byte_end = if end == char_count { text.len() } else { offsets[end] };
        chunks.push(text[byte_start..byte_end].to_string());
        if end == char_count {
            break;
        }
        start += step;
    }

    chunks
}

impl Chunker for SentenceChunker {
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>> {
        let text = normalized(document)?;

        let separators = ["\n\n", ". ", "! ", "? ", " "];
        let raw_chunks = split_and_merge(text, self.chunk_size, self.overlap, &separators);

        Ok(raw_chunks
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Chunk {
                document_id: document.id.clone(),
                chunk_index,
                text,
                embedding: Vec::new(),
            })
            .collect())
    }
}
