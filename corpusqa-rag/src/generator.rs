//! Answer generation from an assembled prompt.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::prompt::AssembledPrompt;

/// An external large-language-model boundary: prompt in, text out.
///
/// Implementations own their transport, timeout, and retry behavior;
/// exhausted retries surface as
/// [`RagError::ServiceUnavailable`](crate::RagError::ServiceUnavailable)
/// so the boundary layer can tell callers to retry later.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// A passage the answer was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// The document the passage came from.
    pub document_id: String,
    /// The full chunk text included in the prompt context.
    pub chunk_text: String,
    /// The similarity score the passage was retrieved with.
    pub score: f32,
}

/// A generated answer together with the passages that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedAnswer {
    /// The model's answer text.
    pub answer: String,
    /// The grounding passages, in the rank order they appeared in the
    /// prompt context.
    pub sources: Vec<Source>,
}

/// Sends assembled prompts to a [`CompletionModel`] and packages the raw
/// answer with its sources.
///
/// Sources are derived directly from the retrieval results that built the
/// prompt, never reparsed from the answer text, so citations stay
/// consistent even when the model's prose omits or garbles them.
pub struct AnswerGenerator {
    model: Arc<dyn CompletionModel>,
}

impl AnswerGenerator {
    /// Create a generator over the given completion model.
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Generate a grounded answer for the assembled prompt.
    pub async fn generate(&self, prompt: &AssembledPrompt) -> Result<GroundedAnswer> {
        let answer = self.model.complete(&prompt.text).await?;

        let sources = prompt
            .selected
            .iter()
            .map(|result| Source {
                document_id: result.chunk.document_id.clone(),
                chunk_text: result.chunk.text.clone(),
                score: result.score,
            })
            .collect::<Vec<_>>();

        info!(answer_len = answer.len(), source_count = sources.len(), "generated answer");
        Ok(GroundedAnswer { answer, sources })
    }
}
