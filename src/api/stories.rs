//! Story API endpoints.

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};

use super::{created, deleted, ApiJson, ApiResult};
use crate::models::{CreateStoryRequest, MessageResponse, Story, UpdateStoryRequest};
use crate::AppState;

pub async fn list_stories(State(state): State<AppState>) -> ApiResult<Json<Vec<Story>>> {
    Ok(Json(state.services.stories.list().await?))
}

pub async fn get_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Story>> {
    Ok(Json(state.services.stories.get(&id).await?))
}

pub async fn create_story(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateStoryRequest>,
) -> ApiResult<Response> {
    Ok(created(state.services.stories.create(&request).await?))
}

pub async fn update_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateStoryRequest>,
) -> ApiResult<Json<Story>> {
    Ok(Json(state.services.stories.update(&id, &request).await?))
}

pub async fn delete_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.stories.delete(&id).await?;
    Ok(deleted("Story"))
}
