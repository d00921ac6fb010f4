//! Bootcamp API endpoints.

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};

use super::{created, deleted, ApiJson, ApiResult};
use crate::models::{Bootcamp, CreateBootcampRequest, MessageResponse, UpdateBootcampRequest};
use crate::AppState;

/// GET /api/bootcamps - List all bootcamps.
pub async fn list_bootcamps(State(state): State<AppState>) -> ApiResult<Json<Vec<Bootcamp>>> {
    Ok(Json(state.services.bootcamps.list().await?))
}

/// GET /api/bootcamps/{id}
pub async fn get_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Bootcamp>> {
    Ok(Json(state.services.bootcamps.get(&id).await?))
}

/// POST /api/bootcamps - Create a bootcamp with its modules.
pub async fn create_bootcamp(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateBootcampRequest>,
) -> ApiResult<Response> {
    Ok(created(state.services.bootcamps.create(&request).await?))
}

/// PUT /api/bootcamps/{id} - Partial update.
pub async fn update_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateBootcampRequest>,
) -> ApiResult<Json<Bootcamp>> {
    Ok(Json(state.services.bootcamps.update(&id, &request).await?))
}

/// DELETE /api/bootcamps/{id}
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.bootcamps.delete(&id).await?;
    Ok(deleted("Bootcamp"))
}
