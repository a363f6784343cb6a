//! Request and response types for the HTTP API

pub mod request;
pub mod response;

pub use request::AskForm;
pub use response::{AskResponse, StatusResponse, UploadResponse};
