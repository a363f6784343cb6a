//! Question endpoint

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AskForm, AskResponse};

/// Reads `q` from either a urlencoded or a multipart form body
#[async_trait]
impl<S> FromRequest<S> for AskForm
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<AskForm>::from_request(req, state)
                .await
                .map_err(|e| Error::InvalidRequest(e.body_text()))?;
            return Ok(form);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| Error::InvalidRequest(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
        {
            if field.name() == Some("q") {
                let q = field
                    .text()
                    .await
                    .map_err(|e| Error::InvalidRequest(format!("Failed to read 'q': {}", e)))?;
                return Ok(AskForm { q: Some(q) });
            }
        }

        Ok(AskForm::default())
    }
}

/// POST /ask - Answer a question about the current document
pub async fn ask(State(state): State<AppState>, form: AskForm) -> Result<Json<AskResponse>> {
    let question = form
        .q
        .ok_or_else(|| Error::InvalidRequest("missing form field 'q'".to_string()))?;

    tracing::info!("Question: \"{}\"", question);

    let outcome = state.pipeline().ask(&question).await?;

    Ok(Json(AskResponse {
        answer: outcome.answer,
    }))
}
