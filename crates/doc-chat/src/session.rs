//! Process-wide document session
//!
//! Exactly one indexed document is live at a time. An upload builds a complete
//! [`IndexedDocument`] first and then swaps it in with a single assignment, so
//! readers see either the old (passages, index) pair or the new one, never a mix.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::retrieval::FlatIndex;

/// Passages of one document together with their index
#[derive(Debug)]
pub struct IndexedDocument {
    id: Uuid,
    filename: String,
    content_hash: String,
    total_pages: Option<u32>,
    indexed_at: DateTime<Utc>,
    passages: Vec<String>,
    index: FlatIndex,
}

impl IndexedDocument {
    /// Pair passages with their index; position `i` of each must describe the same passage
    pub fn new(
        filename: impl Into<String>,
        content_hash: impl Into<String>,
        total_pages: Option<u32>,
        passages: Vec<String>,
        index: FlatIndex,
    ) -> Result<Self> {
        if passages.len() != index.len() {
            return Err(Error::vector_index(format!(
                "Index holds {} vectors for {} passages",
                index.len(),
                passages.len()
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            content_hash: content_hash.into(),
            total_pages,
            indexed_at: Utc::now(),
            passages,
            index,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    /// Passage text at an index position
    pub fn passage(&self, position: usize) -> Option<&str> {
        self.passages.get(position).map(String::as_str)
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            filename: self.filename.clone(),
            content_hash: self.content_hash.clone(),
            total_pages: self.total_pages,
            total_chunks: self.passages.len(),
            dimensions: self.index.dimensions(),
            indexed_at: self.indexed_at,
        }
    }
}

/// Document metadata exposed over the API
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub filename: String,
    pub content_hash: String,
    pub total_pages: Option<u32>,
    pub total_chunks: usize,
    pub dimensions: usize,
    pub indexed_at: DateTime<Utc>,
}

/// Session lifecycle: nothing indexed yet, or one ready document
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Ready(Arc<IndexedDocument>),
}

/// Lock-guarded holder of the current session state
#[derive(Debug, Default)]
pub struct SessionStore {
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new document, discarding the previous one. Returns the replaced document.
    pub fn replace(&self, document: IndexedDocument) -> Option<Arc<IndexedDocument>> {
        let document = Arc::new(document);
        let previous = std::mem::replace(&mut *self.state.write(), SessionState::Ready(document));

        match previous {
            SessionState::Ready(old) => Some(old),
            SessionState::Uninitialized => None,
        }
    }

    /// Current document, or `NoDocumentIndexed` before the first upload
    pub fn snapshot(&self) -> Result<Arc<IndexedDocument>> {
        match &*self.state.read() {
            SessionState::Ready(document) => Ok(Arc::clone(document)),
            SessionState::Uninitialized => Err(Error::NoDocumentIndexed),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), SessionState::Ready(_))
    }
}
