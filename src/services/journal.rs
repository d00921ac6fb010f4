use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::db::{decode_list, encode_list, now_timestamp, Patch, UpdateBuilder};
use crate::errors::AppError;
use crate::models::{CreateJournalRequest, JournalEntry, UpdateJournalRequest};
use crate::validation::{normalize_date, Validate};

const COLUMNS: &str =
    "id, title, body, summary, published_on, category, tags, author, read_time, created_at, updated_at";

#[derive(Clone)]
pub struct JournalService {
    pool: SqlitePool,
}

impl JournalService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateJournalRequest) -> Result<JournalEntry, AppError> {
        request.validated()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();
        let published_on = normalized(&request.published_on)?;

        sqlx::query(
            r#"INSERT INTO journal_entries
                (id, title, body, summary, published_on, category, tags, author, read_time, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&request.body)
        .bind(&request.summary)
        .bind(&published_on)
        .bind(&request.category)
        .bind(encode_list(&request.tags))
        .bind(&request.author)
        .bind(&request.read_time)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!(entry_id = %id, "Journal entry created");

        Ok(JournalEntry {
            id,
            title: request.title.clone(),
            body: request.body.clone(),
            summary: request.summary.clone(),
            published_on,
            category: request.category.clone(),
            tags: request.tags.clone(),
            author: request.author.clone(),
            read_time: request.read_time.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn get(&self, id: &str) -> Result<JournalEntry, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM journal_entries WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(entry_from_row)
            .ok_or_else(|| AppError::not_found("Journal entry"))
    }

    /// All entries, most recently published first.
    pub async fn list(&self) -> Result<Vec<JournalEntry>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM journal_entries ORDER BY published_on DESC, created_at DESC, rowid DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(entry_from_row).collect())
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateJournalRequest,
    ) -> Result<JournalEntry, AppError> {
        request.validated()?;
        let existing = self.get(id).await?;

        let published_on: Patch<String> = match request.published_on.as_option() {
            Some(date) => Patch::Present(normalized(date)?),
            None => Patch::Absent,
        };

        let mut builder = UpdateBuilder::new("journal_entries");
        builder
            .set("title", &request.title)
            .set("body", &request.body)
            .set("summary", &request.summary)
            .set("published_on", &published_on)
            .set("category", &request.category)
            .set_list("tags", &request.tags)
            .set("author", &request.author)
            .set("read_time", &request.read_time);

        let Some(statement) = builder.build(id) else {
            return Ok(existing);
        };
        statement.execute(&self.pool).await?;

        info!(entry_id = %id, "Journal entry updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(entry_id = %id, rows = result.rows_affected(), "Journal entry deleted");
        Ok(())
    }
}

fn normalized(date: &str) -> Result<String, AppError> {
    normalize_date(date)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid published_on date: {}", date)))
}

fn entry_from_row(row: &SqliteRow) -> JournalEntry {
    let tags: Option<String> = row.get("tags");
    JournalEntry {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        summary: row.get("summary"),
        published_on: row.get("published_on"),
        category: row.get("category"),
        tags: decode_list(tags.as_deref()),
        author: row.get("author"),
        read_time: row.get("read_time"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
