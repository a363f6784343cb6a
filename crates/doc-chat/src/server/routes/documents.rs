//! Document upload and status endpoints

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{StatusResponse, UploadResponse};

/// POST /upload - Index a PDF, replacing the current document
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "upload.pdf".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidRequest(format!("Failed to read file: {}", e)))?;

        let summary = state.pipeline().ingest(&filename, &data).await?;
        return Ok(Json(UploadResponse::from(summary)));
    }

    Err(Error::InvalidRequest(
        "missing multipart field 'file'".to_string(),
    ))
}

/// GET /status - Current session state
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let session = state.pipeline().session().state();
    Json(StatusResponse::from(&session))
}
