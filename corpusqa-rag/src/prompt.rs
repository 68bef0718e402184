//! Grounded prompt assembly under a bounded context budget.

use tracing::debug;

use crate::document::RetrievalResult;

/// The grounding contract embedded in every assembled prompt. The generator
/// must answer from the provided context alone and admit when it cannot.
const GROUNDING_INSTRUCTION: &str = "You are a helpful assistant. Use ONLY the provided context \
     to answer the question. Answer concisely and cite the document id of every passage you rely \
     on. If the context does not contain the information needed to answer, say that the context \
     is insufficient instead of guessing.";

/// Shown in place of context when retrieval produced nothing usable.
const NO_CONTEXT_NOTICE: &str = "No relevant context was found in the document corpus. State \
     that no relevant information was found for this question.";

/// Separator between context blocks.
const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// A fully assembled prompt together with the retrieval results that made
/// it into the context window.
///
/// `selected` is the source of truth for citations: the answer's sources
/// are derived from it, never reparsed from the model's prose.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    /// The prompt text to send to the completion model.
    pub text: String,
    /// The retrieval results included in the context, in rank order.
    pub selected: Vec<RetrievalResult>,
}

/// Builds grounding prompts from ranked retrieval results.
///
/// Chunk texts are concatenated in rank order, each tagged with its source
/// document id, until adding the next chunk would exceed the character
/// budget. Chunks are included whole or not at all; nothing is truncated
/// mid-chunk. With no results, the prompt still carries the question plus
/// an instruction to report that nothing relevant was found.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    max_context_size: usize,
}

impl PromptAssembler {
    /// Create an assembler with the given context budget, measured in
    /// characters of chunk text.
    pub fn new(max_context_size: usize) -> Self {
        Self { max_context_size }
    }

    /// Assemble a grounded prompt for `question` from ranked `results`.
    pub fn assemble(&self, question: &str, results: &[RetrievalResult]) -> AssembledPrompt {
        let mut selected = Vec::new();
        let mut used = 0;

        for result in results {
            let chunk_chars = result.chunk.text.chars().count();
            if used + chunk_chars > self.max_context_size {
                break;
            }
            used += chunk_chars;
            selected.push(result.clone());
        }

        if selected.len() < results.len() {
            debug!(
                included = selected.len(),
                dropped = results.len() - selected.len(),
                budget = self.max_context_size,
                "context budget reached, dropping lower-ranked chunks"
            );
        }

        let context = if selected.is_empty() {
            NO_CONTEXT_NOTICE.to_string()
        } else {
            selected
                .iter()
                .map(|result| {
                    format!("[source: {}]\n{}", result.chunk.document_id, result.chunk.text)
                })
                .collect::<Vec<_>>()
                .join(BLOCK_SEPARATOR)
        };

        let text =
            format!("{GROUNDING_INSTRUCTION}\n\nCONTEXT:\n{context}\n\nQUESTION: {question}");

        AssembledPrompt { text, selected }
    }

    /// The configured context budget in characters.
    pub fn max_context_size(&self) -> usize {
        self.max_context_size
    }
}
