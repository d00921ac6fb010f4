//! REST API module.
//!
//! One file per resource plus the query-parameter resource dispatcher.
//! Every handler returns either its JSON payload or an [`AppError`].

mod bootcamps;
mod chat;
mod contacts;
mod journal;
mod memes;
mod resource;
mod stories;

pub use bootcamps::*;
pub use chat::*;
pub use contacts::*;
pub use journal::*;
pub use memes::*;
pub use resource::*;
pub use stories::*;

use axum::{
    body::Bytes,
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{AppError, INVALID_BODY};
use crate::models::MessageResponse;

/// Result type for all handlers.
pub type ApiResult<T> = Result<T, AppError>;

/// `Json` extractor whose rejection is a plain 400 `{"error": "Invalid request body"}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// 201 with the created record.
pub fn created<T: Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

/// 200 with `{"message": "<Resource> deleted successfully"}`.
pub fn deleted(resource: &str) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!("{} deleted successfully", resource)))
}

/// Decode a raw body once the target type is known.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        AppError::BadRequest(INVALID_BODY.to_string())
    })
}
