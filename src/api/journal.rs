//! Journal API endpoints.

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};

use super::{created, deleted, ApiJson, ApiResult};
use crate::models::{CreateJournalRequest, JournalEntry, MessageResponse, UpdateJournalRequest};
use crate::AppState;

/// GET /api/journal - Entries, most recently published first.
pub async fn list_journal(State(state): State<AppState>) -> ApiResult<Json<Vec<JournalEntry>>> {
    Ok(Json(state.services.journal.list().await?))
}

pub async fn get_journal_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JournalEntry>> {
    Ok(Json(state.services.journal.get(&id).await?))
}

pub async fn create_journal_entry(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateJournalRequest>,
) -> ApiResult<Response> {
    Ok(created(state.services.journal.create(&request).await?))
}

pub async fn update_journal_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateJournalRequest>,
) -> ApiResult<Json<JournalEntry>> {
    Ok(Json(state.services.journal.update(&id, &request).await?))
}

pub async fn delete_journal_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.journal.delete(&id).await?;
    Ok(deleted("Journal entry"))
}
