//! Shared application state for the HTTP server

use std::sync::Arc;

use crate::config::DocChatConfig;
use crate::pipeline::DocChatPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<DocChatPipeline>,
}

impl AppState {
    pub fn new(pipeline: DocChatPipeline) -> Self {
        Self {
            inner: Arc::new(pipeline),
        }
    }

    /// Get the pipeline
    pub fn pipeline(&self) -> &DocChatPipeline {
        &self.inner
    }

    /// Get configuration
    pub fn config(&self) -> &DocChatConfig {
        self.inner.config()
    }

    /// Whether a document is indexed
    pub fn is_ready(&self) -> bool {
        self.inner.session().is_ready()
    }
}
