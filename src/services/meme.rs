use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::db::{now_timestamp, UpdateBuilder};
use crate::errors::AppError;
use crate::models::{
    CreateMemeCategoryRequest, CreateMemeRequest, Meme, MemeCategory, MemeCategoryWithMemes,
    UpdateMemeRequest,
};
use crate::validation::Validate;

const MEME_COLUMNS: &str = "id, category_id, type, src, created_at";

/// Meme categories and the memes they own.
///
/// Removing a category removes its memes through the foreign key.
#[derive(Clone)]
pub struct MemeService {
    pool: SqlitePool,
}

impl MemeService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== CATEGORY OPERATIONS ====================

    pub async fn create_category(
        &self,
        request: &CreateMemeCategoryRequest,
    ) -> Result<MemeCategory, AppError> {
        request.validated()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query("INSERT INTO meme_categories (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&request.name)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if let sqlx::Error::Database(db) = &err {
                    if db.is_unique_violation() {
                        return AppError::BadRequest(format!(
                            "Category '{}' already exists",
                            request.name
                        ));
                    }
                }
                AppError::from(err)
            })?;

        info!(category_id = %id, name = %request.name, "Meme category created");

        Ok(MemeCategory {
            id,
            name: request.name.clone(),
            created_at: now,
        })
    }

    /// Categories ordered by name.
    pub async fn list_categories(&self) -> Result<Vec<MemeCategory>, AppError> {
        let rows = sqlx::query("SELECT id, name, created_at FROM meme_categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    pub async fn get_category(&self, id: &str) -> Result<MemeCategory, AppError> {
        let row = sqlx::query("SELECT id, name, created_at FROM meme_categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(category_from_row)
            .ok_or_else(|| AppError::not_found("Category"))
    }

    pub async fn get_category_with_memes(
        &self,
        id: &str,
    ) -> Result<MemeCategoryWithMemes, AppError> {
        let category = self.get_category(id).await?;
        let memes = self.memes_in_category(id).await?;
        Ok(MemeCategoryWithMemes::new(category, memes))
    }

    /// Every category with its memes: one listing query, then one query per category.
    pub async fn list_categories_with_memes(
        &self,
    ) -> Result<Vec<MemeCategoryWithMemes>, AppError> {
        let categories = self.list_categories().await?;

        let mut result = Vec::with_capacity(categories.len());
        for category in categories {
            let memes = self.memes_in_category(&category.id).await?;
            result.push(MemeCategoryWithMemes::new(category, memes));
        }
        Ok(result)
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM meme_categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(category_id = %id, rows = result.rows_affected(), "Meme category deleted");
        Ok(())
    }

    // ==================== MEME OPERATIONS ====================

    pub async fn create_meme(&self, request: &CreateMemeRequest) -> Result<Meme, AppError> {
        request.validated()?;
        self.get_category(&request.category_id).await?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            "INSERT INTO memes (id, category_id, type, src, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.category_id)
        .bind(&request.meme_type)
        .bind(&request.src)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!(meme_id = %id, category_id = %request.category_id, "Meme created");

        Ok(Meme {
            id,
            category_id: request.category_id.clone(),
            meme_type: request.meme_type.clone(),
            src: request.src.clone(),
            created_at: now,
        })
    }

    pub async fn get_meme(&self, id: &str) -> Result<Meme, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM memes WHERE id = ?", MEME_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(meme_from_row)
            .ok_or_else(|| AppError::not_found("Meme"))
    }

    /// Memes do not track `updated_at`; only the present fields are written.
    pub async fn update_meme(&self, id: &str, request: &UpdateMemeRequest) -> Result<Meme, AppError> {
        request.validated()?;
        let existing = self.get_meme(id).await?;

        if let Some(category_id) = request.category_id.as_option() {
            self.get_category(category_id).await?;
        }

        let mut builder = UpdateBuilder::without_timestamp("memes");
        builder
            .set("category_id", &request.category_id)
            .set("type", &request.meme_type)
            .set("src", &request.src);

        let Some(statement) = builder.build(id) else {
            return Ok(existing);
        };
        statement.execute(&self.pool).await?;

        info!(meme_id = %id, "Meme updated");
        self.get_meme(id).await
    }

    pub async fn delete_meme(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM memes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(meme_id = %id, rows = result.rows_affected(), "Meme deleted");
        Ok(())
    }

    async fn memes_in_category(&self, category_id: &str) -> Result<Vec<Meme>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM memes WHERE category_id = ? ORDER BY created_at DESC, rowid DESC",
            MEME_COLUMNS
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(meme_from_row).collect())
    }
}

fn category_from_row(row: &SqliteRow) -> MemeCategory {
    MemeCategory {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

fn meme_from_row(row: &SqliteRow) -> Meme {
    Meme {
        id: row.get("id"),
        category_id: row.get("category_id"),
        meme_type: row.get("type"),
        src: row.get("src"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Patch;
    use crate::services::test_support::test_pool;

    fn category(name: &str) -> CreateMemeCategoryRequest {
        CreateMemeCategoryRequest { name: name.into() }
    }

    fn meme(category_id: &str, src: &str) -> CreateMemeRequest {
        CreateMemeRequest {
            category_id: category_id.into(),
            meme_type: "img".into(),
            src: src.into(),
        }
    }

    #[tokio::test]
    async fn test_categories_sorted_by_name_with_newest_memes_first() {
        let (_dir, pool) = test_pool().await;
        let service = MemeService::new(pool);

        let rust = service.create_category(&category("rust")).await.unwrap();
        let go = service.create_category(&category("go")).await.unwrap();
        service.create_meme(&meme(&rust.id, "a.png")).await.unwrap();
        service.create_meme(&meme(&rust.id, "b.png")).await.unwrap();

        let all = service.list_categories_with_memes().await.unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["go", "rust"]);
        assert_eq!(all[0].id, go.id);
        assert!(all[0].memes.is_empty());

        let srcs: Vec<&str> = all[1].memes.iter().map(|m| m.src.as_str()).collect();
        assert_eq!(srcs, vec!["b.png", "a.png"]);
    }

    #[tokio::test]
    async fn test_category_delete_cascades_to_memes() {
        let (_dir, pool) = test_pool().await;
        let service = MemeService::new(pool);

        let cat = service.create_category(&category("cats")).await.unwrap();
        for n in 0..3 {
            service
                .create_meme(&meme(&cat.id, &format!("{}.png", n)))
                .await
                .unwrap();
        }

        service.delete_category(&cat.id).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memes")
            .fetch_one(&service.pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(matches!(
            service.get_category_with_memes(&cat.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_category_name() {
        let (_dir, pool) = test_pool().await;
        let service = MemeService::new(pool);

        service.create_category(&category("dup")).await.unwrap();
        let err = service.create_category(&category("dup")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_meme_requires_existing_category() {
        let (_dir, pool) = test_pool().await;
        let service = MemeService::new(pool);

        let err = service.create_meme(&meme("missing", "x.png")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_meme_without_timestamp() {
        let (_dir, pool) = test_pool().await;
        let service = MemeService::new(pool);

        let cat = service.create_category(&category("clips")).await.unwrap();
        let created = service.create_meme(&meme(&cat.id, "old.png")).await.unwrap();

        let request = UpdateMemeRequest {
            meme_type: Patch::Present("mp4".into()),
            src: Patch::Present("new.mp4".into()),
            ..Default::default()
        };
        let updated = service.update_meme(&created.id, &request).await.unwrap();
        assert_eq!(updated.meme_type, "mp4");
        assert_eq!(updated.src, "new.mp4");
        assert_eq!(updated.category_id, cat.id);
        assert_eq!(updated.created_at, created.created_at);

        service.delete_meme(&created.id).await.unwrap();
        service.delete_meme(&created.id).await.unwrap();
    }
}
