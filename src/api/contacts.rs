//! Contact API endpoints.
//!
//! Submitting the contact form is public; reading submissions is not.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};

use super::{created, deleted, ApiJson, ApiResult};
use crate::models::{Contact, ContactPage, CreateContactRequest, MessageResponse, PageQuery};
use crate::AppState;

/// GET /api/contacts?page=&page_size= - Newest first.
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<ContactPage>> {
    let page = state.services.contacts.list((&query).into()).await?;
    Ok(Json(page))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Contact>> {
    Ok(Json(state.services.contacts.get(&id).await?))
}

pub async fn create_contact(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateContactRequest>,
) -> ApiResult<Response> {
    Ok(created(state.services.contacts.create(&request).await?))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.contacts.delete(&id).await?;
    Ok(deleted("Contact"))
}
