//! Response types

use serde::Serialize;
use uuid::Uuid;

use crate::session::{DocumentSummary, SessionState};

/// Response of `POST /upload`
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    /// Human-readable confirmation
    pub message: String,
    /// ID of the newly indexed document
    pub document_id: Uuid,
    /// Uploaded filename
    pub filename: String,
    /// Number of indexed passages
    pub chunks: usize,
    /// Page count, when the PDF structure could be read
    pub pages: Option<u32>,
}

impl From<DocumentSummary> for UploadResponse {
    fn from(summary: DocumentSummary) -> Self {
        Self {
            message: "Document processed and indexed.".to_string(),
            document_id: summary.id,
            filename: summary.filename,
            chunks: summary.total_chunks,
            pages: summary.total_pages,
        }
    }
}

/// Response of `POST /ask`
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    /// Generated answer text, as returned by the model
    pub answer: String,
}

/// Response of `GET /status`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StatusResponse {
    Empty,
    Ready { document: DocumentSummary },
}

impl From<&SessionState> for StatusResponse {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::Uninitialized => StatusResponse::Empty,
            SessionState::Ready(document) => StatusResponse::Ready {
                document: document.summary(),
            },
        }
    }
}
