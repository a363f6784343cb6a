//! Grounded answer generation

use std::sync::Arc;
use std::time::Duration;

use super::{LlmProvider, PromptBuilder};
use crate::error::{bounded, Result};

/// Answers a question from an ordered set of context passages
pub struct Answerer {
    llm: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl Answerer {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Build the prompt from `passages` and return the model's answer text unmodified
    pub async fn answer<S: AsRef<str>>(&self, question: &str, passages: &[S]) -> Result<String> {
        let context = PromptBuilder::build_context(passages);
        let prompt = PromptBuilder::build_prompt(question, &context);

        tracing::debug!(
            "Prompt for {} ({}/{}): {} passages, {} chars",
            question,
            self.llm.name(),
            self.llm.model(),
            passages.len(),
            prompt.len()
        );

        bounded("generation", self.timeout, self.llm.generate(&prompt)).await
    }
}
