//! doc-chat: single-document question answering over uploaded PDFs
//!
//! An uploaded PDF is split into passages, embedded locally with
//! all-MiniLM-L6-v2 and held in an exact nearest-neighbour index. Questions
//! retrieve the closest passages and Gemini answers from them.

pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

pub use config::DocChatConfig;
pub use error::{Error, Result};
pub use pipeline::{AskOutcome, DocChatPipeline};
pub use server::DocChatServer;
pub use session::{DocumentSummary, IndexedDocument, SessionState, SessionStore};
