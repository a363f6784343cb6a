//! Answer generation from retrieved context

mod answerer;
mod gemini;
mod prompt;

pub use answerer::Answerer;
pub use gemini::GeminiClient;
pub use prompt::PromptBuilder;

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generative model backends
///
/// Implementations:
/// - `GeminiClient`: Google Generative Language API
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a fully built prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check whether the backend is reachable with the configured credentials
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get model name
    fn model(&self) -> &str;
}
