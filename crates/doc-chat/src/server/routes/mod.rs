//! HTTP routes

pub mod documents;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build the API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route(
            "/upload",
            post(documents::upload).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/ask", post(query::ask))
        .route("/status", get(documents::status))
}

/// GET / - Usage hint
async fn welcome() -> Json<&'static str> {
    Json("Welcome to DocChat! Use POST /upload to send a PDF and POST /ask to ask questions.")
}
