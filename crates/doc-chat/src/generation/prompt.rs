//! Prompt template for answer generation

/// Prompt builder for document questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved passages into one context block, order preserved
    pub fn build_context<S: AsRef<str>>(passages: &[S]) -> String {
        passages
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the full prompt sent to the generative model
    pub fn build_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are a helpful assistant. Use the context to answer the question.

Context:
{context}

Question: {question}
Answer:"#,
            context = context,
            question = question
        )
    }
}
