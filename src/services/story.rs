use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::db::{now_timestamp, UpdateBuilder};
use crate::errors::AppError;
use crate::models::{CreateStoryRequest, Story, UpdateStoryRequest};
use crate::validation::Validate;

const COLUMNS: &str = "id, media, mimetype, title, description, created_at, updated_at";

#[derive(Clone)]
pub struct StoryService {
    pool: SqlitePool,
}

impl StoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateStoryRequest) -> Result<Story, AppError> {
        request.validated()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            "INSERT INTO stories (id, media, mimetype, title, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.media)
        .bind(&request.mimetype)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!(story_id = %id, "Story created");

        Ok(Story {
            id,
            media: request.media.clone(),
            mimetype: request.mimetype.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Story, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM stories WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(story_from_row)
            .ok_or_else(|| AppError::not_found("Story"))
    }

    /// All stories, newest first.
    pub async fn list(&self) -> Result<Vec<Story>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM stories ORDER BY created_at DESC, rowid DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(story_from_row).collect())
    }

    pub async fn update(&self, id: &str, request: &UpdateStoryRequest) -> Result<Story, AppError> {
        request.validated()?;
        let existing = self.get(id).await?;

        let mut builder = UpdateBuilder::new("stories");
        builder
            .set("media", &request.media)
            .set("mimetype", &request.mimetype)
            .set("title", &request.title)
            .set("description", &request.description);

        let Some(statement) = builder.build(id) else {
            return Ok(existing);
        };
        statement.execute(&self.pool).await?;

        info!(story_id = %id, "Story updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(story_id = %id, rows = result.rows_affected(), "Story deleted");
        Ok(())
    }
}

fn story_from_row(row: &SqliteRow) -> Story {
    Story {
        id: row.get("id"),
        media: row.get("media"),
        mimetype: row.get("mimetype"),
        title: row.get("title"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
