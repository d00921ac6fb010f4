//! Database module for SQLite persistence.
//!
//! Owns connection bootstrap, the idempotent schema, and the text encodings
//! shared by every service (timestamps and ordered-list columns).

mod patch;

pub use patch::*;

use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and create the schema.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Create every table if it does not exist yet.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for schema in [
        BOOTCAMP_SCHEMA,
        JOURNAL_SCHEMA,
        MEME_SCHEMA,
        STORY_SCHEMA,
        CONTACT_SCHEMA,
        CHAT_SCHEMA,
    ] {
        sqlx::raw_sql(schema).execute(pool).await?;
    }

    tracing::info!("Database schema ready");
    Ok(())
}

const BOOTCAMP_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS bootcamps (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    subtitle TEXT NOT NULL,
    description TEXT NOT NULL,
    long_description TEXT NOT NULL,
    duration TEXT NOT NULL,
    level TEXT NOT NULL,
    price TEXT NOT NULL,
    tech_stack TEXT NOT NULL,
    highlights TEXT NOT NULL,
    project_features TEXT NOT NULL,
    target_audience TEXT NOT NULL,
    images TEXT NOT NULL DEFAULT '[]',
    videos TEXT NOT NULL DEFAULT '[]',
    github_repo TEXT,
    demo_url TEXT,
    status TEXT NOT NULL CHECK (status IN ('active', 'upcoming', 'completed')),
    enrolled_count INTEGER NOT NULL DEFAULT 0,
    rating REAL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bootcamp_modules (
    id TEXT PRIMARY KEY,
    bootcamp_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    duration TEXT NOT NULL,
    topics TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (bootcamp_id) REFERENCES bootcamps(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_bootcamp_modules_bootcamp_id ON bootcamp_modules(bootcamp_id);
"#;

const JOURNAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS journal_entries (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    summary TEXT NOT NULL,
    published_on TEXT NOT NULL,
    category TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    author TEXT,
    read_time TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const MEME_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meme_categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS memes (
    id TEXT PRIMARY KEY,
    category_id TEXT NOT NULL,
    type TEXT NOT NULL CHECK (type IN ('img', 'yt', 'mp4', 'webm')),
    src TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (category_id) REFERENCES meme_categories(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_memes_category_id ON memes(category_id);
"#;

const STORY_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stories (
    id TEXT PRIMARY KEY,
    media TEXT NOT NULL,
    mimetype TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const CONTACT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    message TEXT NOT NULL,
    subject TEXT,
    created_at TEXT NOT NULL
);
"#;

const CHAT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chat_sessions (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_messages (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
    content TEXT NOT NULL,
    reasoning_details TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (session_id) REFERENCES chat_sessions(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_chat_messages_session_id ON chat_messages(session_id);
CREATE INDEX IF NOT EXISTS idx_chat_messages_created_at ON chat_messages(created_at DESC);
"#;

/// Current time as fixed-width RFC 3339 text, so string order is time order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Encode an ordered list for a text column. Empty lists become `[]`.
pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode an ordered-list column. NULL, blank or malformed text yields an empty list.
pub fn decode_list(s: Option<&str>) -> Vec<String> {
    match s {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(text).unwrap_or_default(),
        _ => Vec::new(),
    }
}
