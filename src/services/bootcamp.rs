use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;

use crate::db::{decode_list, encode_list, now_timestamp, Patch, UpdateBuilder};
use crate::errors::AppError;
use crate::models::{Bootcamp, BootcampModule, CreateBootcampRequest, UpdateBootcampRequest};
use crate::validation::Validate;

const COLUMNS: &str = r#"id, title, subtitle, description, long_description, tech_stack,
    duration, level, price, highlights, project_features, target_audience,
    images, videos, github_repo, demo_url, status, enrolled_count, rating,
    created_at, updated_at"#;

/// Bootcamps and their module rows.
///
/// Writes touching modules run in one transaction together with the
/// bootcamp row, so a failed module insert leaves nothing behind.
#[derive(Clone)]
pub struct BootcampService {
    pool: SqlitePool,
}

impl BootcampService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateBootcampRequest) -> Result<Bootcamp, AppError> {
        request.validated()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO bootcamps (
                id, title, subtitle, description, long_description, tech_stack,
                duration, level, price, highlights, project_features, target_audience,
                images, videos, github_repo, demo_url, status, enrolled_count, rating,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&request.subtitle)
        .bind(&request.description)
        .bind(&request.long_description)
        .bind(encode_list(&request.tech_stack))
        .bind(&request.duration)
        .bind(&request.level)
        .bind(&request.price)
        .bind(encode_list(&request.highlights))
        .bind(encode_list(&request.project_features))
        .bind(encode_list(&request.target_audience))
        .bind(encode_list(&request.images))
        .bind(encode_list(&request.videos))
        .bind(&request.github_repo)
        .bind(&request.demo_url)
        .bind(&request.status)
        .bind(request.enrolled_count)
        .bind(request.rating)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        insert_modules(&mut *tx, &id, &request.modules, &now).await?;

        tx.commit().await?;

        info!(bootcamp_id = %id, modules = request.modules.len(), "Bootcamp created");
        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Bootcamp, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM bootcamps WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AppError::not_found("Bootcamp"));
        };

        let modules = self.modules_of(id).await?;
        Ok(bootcamp_from_row(&row, modules))
    }

    /// All bootcamps, newest first, each with its modules.
    pub async fn list(&self) -> Result<Vec<Bootcamp>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bootcamps ORDER BY created_at DESC, rowid DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut bootcamps = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.get("id");
            let modules = self.modules_of(&id).await?;
            bootcamps.push(bootcamp_from_row(row, modules));
        }
        Ok(bootcamps)
    }

    /// Apply the present fields. A present `modules` list replaces every
    /// existing module of the bootcamp.
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateBootcampRequest,
    ) -> Result<Bootcamp, AppError> {
        request.validated()?;
        let existing = self.get(id).await?;

        let mut builder = UpdateBuilder::new("bootcamps");
        builder
            .set("title", &request.title)
            .set("subtitle", &request.subtitle)
            .set("description", &request.description)
            .set("long_description", &request.long_description)
            .set_list("tech_stack", &request.tech_stack)
            .set("duration", &request.duration)
            .set("level", &request.level)
            .set("price", &request.price)
            .set_list("highlights", &request.highlights)
            .set_list("project_features", &request.project_features)
            .set_list("target_audience", &request.target_audience)
            .set_list("images", &request.images)
            .set_list("videos", &request.videos)
            .set("github_repo", &request.github_repo)
            .set("demo_url", &request.demo_url)
            .set("status", &request.status)
            .set("enrolled_count", &request.enrolled_count)
            .set("rating", &request.rating);
        let statement = builder.build(id);

        let Patch::Present(modules) = &request.modules else {
            // Only scalar and list columns changed, if anything.
            let Some(statement) = statement else {
                return Ok(existing);
            };
            statement.execute(&self.pool).await?;
            info!(bootcamp_id = %id, "Bootcamp updated");
            return self.get(id).await;
        };

        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;

        match statement {
            Some(statement) => {
                statement.execute(&mut *tx).await?;
            }
            None => {
                sqlx::query("UPDATE bootcamps SET updated_at = ? WHERE id = ?")
                    .bind(&now)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        sqlx::query("DELETE FROM bootcamp_modules WHERE bootcamp_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_modules(&mut *tx, id, modules, &now).await?;

        tx.commit().await?;

        info!(bootcamp_id = %id, modules = modules.len(), "Bootcamp updated with new modules");
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM bootcamps WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(bootcamp_id = %id, rows = result.rows_affected(), "Bootcamp deleted");
        Ok(())
    }

    async fn modules_of(&self, bootcamp_id: &str) -> Result<Vec<BootcampModule>, AppError> {
        let rows = sqlx::query(
            "SELECT title, description, duration, topics FROM bootcamp_modules WHERE bootcamp_id = ? ORDER BY position ASC",
        )
        .bind(bootcamp_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(module_from_row).collect())
    }
}

async fn insert_modules(
    conn: &mut SqliteConnection,
    bootcamp_id: &str,
    modules: &[BootcampModule],
    now: &str,
) -> Result<(), sqlx::Error> {
    for (position, module) in modules.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO bootcamp_modules
                (id, bootcamp_id, position, title, description, duration, topics, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(bootcamp_id)
        .bind(position as i64)
        .bind(&module.title)
        .bind(&module.description)
        .bind(&module.duration)
        .bind(encode_list(&module.topics))
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

fn bootcamp_from_row(row: &SqliteRow, modules: Vec<BootcampModule>) -> Bootcamp {
    let list = |column: &str| {
        let raw: Option<String> = row.get(column);
        decode_list(raw.as_deref())
    };

    Bootcamp {
        id: row.get("id"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        description: row.get("description"),
        long_description: row.get("long_description"),
        tech_stack: list("tech_stack"),
        duration: row.get("duration"),
        level: row.get("level"),
        price: row.get("price"),
        highlights: list("highlights"),
        modules,
        project_features: list("project_features"),
        target_audience: list("target_audience"),
        images: list("images"),
        videos: list("videos"),
        github_repo: row.get("github_repo"),
        demo_url: row.get("demo_url"),
        status: row.get("status"),
        enrolled_count: row.get("enrolled_count"),
        rating: row.get("rating"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn module_from_row(row: &SqliteRow) -> BootcampModule {
    let topics: Option<String> = row.get("topics");
    BootcampModule {
        title: row.get("title"),
        description: row.get("description"),
        duration: row.get("duration"),
        topics: decode_list(topics.as_deref()),
    }
}
