//! Request types

use serde::Deserialize;

/// Form body of `POST /ask`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskForm {
    /// The question
    #[serde(default)]
    pub q: Option<String>,
}
