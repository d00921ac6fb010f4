use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::db::now_timestamp;
use crate::errors::AppError;
use crate::models::{Contact, ContactPage, CreateContactRequest, Pagination};
use crate::validation::Validate;

const COLUMNS: &str = "id, name, email, message, subject, created_at";

/// Contact form submissions. There is no update: contacts are append-only.
#[derive(Clone)]
pub struct ContactService {
    pool: SqlitePool,
}

impl ContactService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateContactRequest) -> Result<Contact, AppError> {
        request.validated()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            "INSERT INTO contacts (id, name, email, message, subject, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.message)
        .bind(&request.subject)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!(contact_id = %id, "Contact submitted");

        Ok(Contact {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            message: request.message.clone(),
            subject: request.subject.clone(),
            created_at: now,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Contact, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM contacts WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(contact_from_row)
            .ok_or_else(|| AppError::not_found("Contact"))
    }

    /// One page of contacts, newest first, with the overall total.
    pub async fn list(&self, pagination: Pagination) -> Result<ContactPage, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM contacts ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(pagination.page_size)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let contacts = rows.iter().map(contact_from_row).collect();
        Ok(ContactPage::new(contacts, total, pagination))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(contact_id = %id, rows = result.rows_affected(), "Contact deleted");
        Ok(())
    }
}

fn contact_from_row(row: &SqliteRow) -> Contact {
    Contact {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        message: row.get("message"),
        subject: row.get("subject"),
        created_at: row.get("created_at"),
    }
}
