//! Meme and meme category API endpoints.

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};

use super::{created, deleted, ApiJson, ApiResult};
use crate::models::{
    CreateMemeCategoryRequest, CreateMemeRequest, Meme, MemeCategoryWithMemes, MessageResponse,
    UpdateMemeRequest,
};
use crate::AppState;

/// GET /api/memes/categories - Every category with its memes.
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MemeCategoryWithMemes>>> {
    Ok(Json(state.services.memes.list_categories_with_memes().await?))
}

/// GET /api/memes/categories/{id} - One category with its memes.
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MemeCategoryWithMemes>> {
    Ok(Json(state.services.memes.get_category_with_memes(&id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateMemeCategoryRequest>,
) -> ApiResult<Response> {
    Ok(created(state.services.memes.create_category(&request).await?))
}

/// DELETE /api/memes/categories/{id} - Also removes the category's memes.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.memes.delete_category(&id).await?;
    Ok(deleted("Category"))
}

pub async fn get_meme(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Meme>> {
    Ok(Json(state.services.memes.get_meme(&id).await?))
}

pub async fn create_meme(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateMemeRequest>,
) -> ApiResult<Response> {
    Ok(created(state.services.memes.create_meme(&request).await?))
}

pub async fn update_meme(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateMemeRequest>,
) -> ApiResult<Json<Meme>> {
    Ok(Json(state.services.memes.update_meme(&id, &request).await?))
}

pub async fn delete_meme(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.memes.delete_meme(&id).await?;
    Ok(deleted("Meme"))
}
