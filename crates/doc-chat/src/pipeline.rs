//! Upload and question pipeline
//!
//! Owns the extraction, chunking, embedding, retrieval and generation
//! components together with the session store they feed.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::config::DocChatConfig;
use crate::embeddings::{Embedder, OnnxEmbedder};
use crate::error::{bounded, Error, Result};
use crate::generation::{Answerer, GeminiClient, LlmProvider};
use crate::ingestion::{ParagraphChunker, PdfTextExtractor, TextExtractor};
use crate::retrieval::{FlatIndex, RetrievedPassage, Retriever};
use crate::session::{DocumentSummary, IndexedDocument, SessionStore};

/// Answer to a question with the passages it was grounded on
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub answer: String,
    pub passages: Vec<RetrievedPassage>,
}

/// Coordinates document ingestion and question answering
pub struct DocChatPipeline {
    config: DocChatConfig,
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn Embedder>,
    chunker: ParagraphChunker,
    retriever: Retriever,
    answerer: Answerer,
    session: SessionStore,
    /// Serializes uploads so the last completed one wins
    ingest_gate: Mutex<()>,
}

impl DocChatPipeline {
    /// Assemble a pipeline from explicit components
    pub fn new(
        config: DocChatConfig,
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let chunker = ParagraphChunker::new(config.chunking.max_chars);
        let retriever = Retriever::new(
            Arc::clone(&embedder),
            config.retrieval.top_k,
            config.embeddings.timeout(),
        );
        let answerer = Answerer::new(llm, config.llm.timeout());

        Self {
            config,
            extractor,
            embedder,
            chunker,
            retriever,
            answerer,
            session: SessionStore::new(),
            ingest_gate: Mutex::new(()),
        }
    }

    /// Build the production pipeline: PDF extraction, local MiniLM, Gemini
    pub async fn from_config(config: DocChatConfig) -> Result<Self> {
        tracing::info!("Initializing document chat pipeline...");

        let embedder = OnnxEmbedder::new(&config.embeddings).await?;
        tracing::info!(
            "Embedder initialized ({}, {} dims)",
            embedder.name(),
            embedder.dimensions()
        );

        let llm = GeminiClient::new(&config.llm)?;
        tracing::info!("Gemini client initialized (model: {})", config.llm.model);

        Ok(Self::new(
            config,
            Arc::new(PdfTextExtractor::new()),
            Arc::new(embedder),
            Arc::new(llm),
        ))
    }

    pub fn config(&self) -> &DocChatConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        self.answerer.llm()
    }

    /// Extract, chunk, embed and index an upload, then make it the current document.
    ///
    /// The session is only touched after every stage succeeded.
    pub async fn ingest(&self, filename: &str, data: &[u8]) -> Result<DocumentSummary> {
        let _gate = self.ingest_gate.lock().await;
        let start = Instant::now();

        tracing::info!("Processing upload: {} ({} bytes)", filename, data.len());

        let content_hash = hex::encode(Sha256::digest(data));

        let extracted = self.extractor.extract(filename, data).await?;
        tracing::debug!(
            "Extracted {} chars from {} ({} via {})",
            extracted.content.chars().count(),
            filename,
            extracted
                .total_pages
                .map(|p| format!("{} pages", p))
                .unwrap_or_else(|| "unknown pages".to_string()),
            self.extractor.name()
        );

        let passages = self.chunker.chunk(&extracted.content);
        if passages.is_empty() {
            return Err(Error::EmptyDocument(filename.to_string()));
        }
        tracing::debug!("Chunked {} into {} passages", filename, passages.len());

        let embeddings = bounded(
            "embedding",
            self.config.embeddings.timeout(),
            self.embedder.embed_batch(&passages),
        )
        .await?;

        if embeddings.len() != passages.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                passages.len(),
                embeddings.len()
            )));
        }

        let index = FlatIndex::build(embeddings)?;
        let document = IndexedDocument::new(
            filename,
            content_hash,
            extracted.total_pages,
            passages,
            index,
        )?;
        let summary = document.summary();

        if let Some(previous) = self.session.replace(document) {
            tracing::info!("Replaced previous document: {}", previous.filename());
        }

        tracing::info!(
            "Indexed {} ({} passages) in {}ms",
            summary.filename,
            summary.total_chunks,
            start.elapsed().as_millis()
        );

        Ok(summary)
    }

    /// Answer a question against the current document
    pub async fn ask(&self, question: &str) -> Result<AskOutcome> {
        let document = self.session.snapshot()?;

        if question.trim().is_empty() {
            return Err(Error::InvalidRequest("question must not be empty".to_string()));
        }
        let start = Instant::now();

        let passages = self.retriever.retrieve(&document, question).await?;
        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        let answer = self.answerer.answer(question, &texts).await?;

        tracing::info!(
            "Answered question against {} using {} passages in {}ms",
            document.filename(),
            passages.len(),
            start.elapsed().as_millis()
        );

        Ok(AskOutcome { answer, passages })
    }
}
