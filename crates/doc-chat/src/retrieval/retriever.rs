//! Query-time retrieval: embed the question, search the index, resolve passages

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::embeddings::Embedder;
use crate::error::{bounded, Error, Result};
use crate::session::IndexedDocument;

/// Passage returned for a query
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedPassage {
    /// Position in the document's passage list
    pub position: usize,
    /// Passage text
    pub text: String,
    /// Squared Euclidean distance between query and passage embeddings
    pub distance: f32,
}

/// Retrieves the top-k passages of a document for a query
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    timeout: Duration,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, top_k: usize, timeout: Duration) -> Self {
        Self {
            embedder,
            top_k,
            timeout,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Nearest passages for `query`, nearest first
    pub async fn retrieve(
        &self,
        document: &IndexedDocument,
        query: &str,
    ) -> Result<Vec<RetrievedPassage>> {
        let query_embedding = bounded(
            "query embedding",
            self.timeout,
            self.embedder.embed(query),
        )
        .await?;

        let neighbors = document.index().search(&query_embedding, self.top_k)?;

        let passages = neighbors
            .into_iter()
            .map(|n| {
                let text = document.passage(n.position).ok_or_else(|| {
                    Error::vector_index(format!("Index returned unknown position {}", n.position))
                })?;
                Ok(RetrievedPassage {
                    position: n.position,
                    text: text.to_string(),
                    distance: n.distance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Retrieved {} passages from '{}' (nearest distance {:?})",
            passages.len(),
            document.filename(),
            passages.first().map(|p| p.distance)
        );

        Ok(passages)
    }
}
