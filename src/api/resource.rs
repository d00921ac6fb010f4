//! Unified resource dispatcher.
//!
//! `/api/resource?resource=R` addresses a collection and
//! `/api/resource/id?resource=R&id=X` a single record, where `R` is one of
//! `bootcamps`, `journal`, `memes` or `categories`.

use std::str::FromStr;

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{created, deleted, parse_body, ApiResult};
use crate::errors::AppError;
use crate::AppState;

const VALID_RESOURCES: &str = "bootcamps, journal, memes, categories";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Bootcamps,
    Journal,
    Memes,
    Categories,
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bootcamps" => Ok(ResourceKind::Bootcamps),
            "journal" => Ok(ResourceKind::Journal),
            "memes" => Ok(ResourceKind::Memes),
            "categories" => Ok(ResourceKind::Categories),
            _ => Err(AppError::BadRequest(format!(
                "invalid resource type. Valid values: {}",
                VALID_RESOURCES
            ))),
        }
    }
}

/// Raw query parameters of the dispatcher routes.
#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub resource: Option<String>,
    pub id: Option<String>,
}

impl ResourceQuery {
    fn kind(&self) -> Result<ResourceKind, AppError> {
        match self.resource.as_deref().map(str::trim) {
            None | Some("") => Err(AppError::BadRequest(format!(
                "resource parameter is required. Valid values: {}",
                VALID_RESOURCES
            ))),
            Some(resource) => resource.parse(),
        }
    }

    fn id(&self) -> Result<&str, AppError> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("ID is required".to_string()))
    }
}

fn not_allowed(supported: &str) -> AppError {
    AppError::MethodNotAllowed(format!("Method not allowed. Supported methods: {}", supported))
}

/// GET /api/resource?resource=R
pub async fn list_resource(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> ApiResult<Response> {
    let services = &state.services;
    let response = match query.kind()? {
        ResourceKind::Bootcamps => Json(services.bootcamps.list().await?).into_response(),
        ResourceKind::Journal => Json(services.journal.list().await?).into_response(),
        ResourceKind::Categories => {
            Json(services.memes.list_categories_with_memes().await?).into_response()
        }
        ResourceKind::Memes => return Err(not_allowed("POST")),
    };
    Ok(response)
}

/// POST /api/resource?resource=R
pub async fn create_resource(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
    body: Bytes,
) -> ApiResult<Response> {
    let services = &state.services;
    let response = match query.kind()? {
        ResourceKind::Bootcamps => created(services.bootcamps.create(&parse_body(&body)?).await?),
        ResourceKind::Journal => created(services.journal.create(&parse_body(&body)?).await?),
        ResourceKind::Memes => created(services.memes.create_meme(&parse_body(&body)?).await?),
        ResourceKind::Categories => {
            created(services.memes.create_category(&parse_body(&body)?).await?)
        }
    };
    Ok(response)
}

/// GET /api/resource/id?resource=R&id=X
pub async fn get_resource(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> ApiResult<Response> {
    let id = query.id()?;
    let services = &state.services;
    let response = match query.kind()? {
        ResourceKind::Bootcamps => Json(services.bootcamps.get(id).await?).into_response(),
        ResourceKind::Journal => Json(services.journal.get(id).await?).into_response(),
        ResourceKind::Memes => Json(services.memes.get_meme(id).await?).into_response(),
        ResourceKind::Categories => {
            Json(services.memes.get_category_with_memes(id).await?).into_response()
        }
    };
    Ok(response)
}

/// PUT /api/resource/id?resource=R&id=X
pub async fn update_resource(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
    body: Bytes,
) -> ApiResult<Response> {
    let id = query.id()?;
    let services = &state.services;
    let response = match query.kind()? {
        ResourceKind::Bootcamps => {
            Json(services.bootcamps.update(id, &parse_body(&body)?).await?).into_response()
        }
        ResourceKind::Journal => {
            Json(services.journal.update(id, &parse_body(&body)?).await?).into_response()
        }
        ResourceKind::Memes => {
            Json(services.memes.update_meme(id, &parse_body(&body)?).await?).into_response()
        }
        ResourceKind::Categories => return Err(not_allowed("GET, DELETE")),
    };
    Ok(response)
}

/// DELETE /api/resource/id?resource=R&id=X
pub async fn delete_resource(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> ApiResult<Response> {
    let id = query.id()?;
    let services = &state.services;
    let resource = match query.kind()? {
        ResourceKind::Bootcamps => {
            services.bootcamps.delete(id).await?;
            "Bootcamp"
        }
        ResourceKind::Journal => {
            services.journal.delete(id).await?;
            "Journal entry"
        }
        ResourceKind::Memes => {
            services.memes.delete_meme(id).await?;
            "Meme"
        }
        ResourceKind::Categories => {
            services.memes.delete_category(id).await?;
            "Category"
        }
    };
    Ok(deleted(resource).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_parsing() {
        assert_eq!("journal".parse::<ResourceKind>().unwrap(), ResourceKind::Journal);
        assert!(matches!(
            "users".parse::<ResourceKind>(),
            Err(AppError::BadRequest(_))
        ));

        let missing = ResourceQuery::default();
        assert!(matches!(missing.kind(), Err(AppError::BadRequest(_))));
        assert!(matches!(missing.id(), Err(AppError::BadRequest(_))));

        let query = ResourceQuery {
            resource: Some("categories".into()),
            id: Some("abc".into()),
        };
        assert_eq!(query.kind().unwrap(), ResourceKind::Categories);
        assert_eq!(query.id().unwrap(), "abc");
    }
}
