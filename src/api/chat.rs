//! Chat endpoint.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use super::{ApiJson, ApiResult};
use crate::chat::ChatOutcome;
use crate::models::ChatRequest;
use crate::AppState;

/// POST /api/chat - One turn of the site chat.
///
/// A non-success reply from the completion upstream is relayed with its own
/// status, content type and body.
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<Response> {
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());

    match state.chat.handle_turn(&request, referer).await? {
        ChatOutcome::Answered(response) => Ok(Json(response).into_response()),
        ChatOutcome::Passthrough {
            status,
            content_type,
            body,
        } => {
            let content_type =
                content_type.unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
            Ok((status, [(header::CONTENT_TYPE, content_type)], body).into_response())
        }
    }
}
