//! Chat sessions and the context window sent to the completion upstream.
//!
//! A turn loads (or creates) the session, reads the latest messages, stores
//! the user's message, then asks the upstream for an answer. The user's
//! message is stored before the upstream call so a failed completion still
//! leaves it in the history.

mod upstream;

pub use upstream::{Completion, CompletionRequest, UpstreamClient, UpstreamMessage};

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode};
use serde_json::{json, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

use crate::config::Config;
use crate::db::now_timestamp;
use crate::errors::AppError;
use crate::models::{ChatMessage, ChatRequest, ChatResponse, ChatRole, ChatSession};
use crate::validation::Validate;

/// Number of stored messages sent as context with each turn.
pub const CONTEXT_WINDOW: i64 = 5;

/// Result of one chat turn.
#[derive(Debug)]
pub enum ChatOutcome {
    Answered(ChatResponse),
    /// The upstream answered with a non-success status; replay it untouched.
    Passthrough {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: Bytes,
    },
}

#[derive(Clone)]
pub struct ChatManager {
    pool: SqlitePool,
    upstream: UpstreamClient,
    model: String,
    persona: Arc<str>,
}

impl ChatManager {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            upstream: UpstreamClient::new(&config.openrouter),
            model: config.openrouter.model.clone(),
            persona: Arc::from(config.persona.as_str()),
        }
    }

    /// Load the session, creating it on first use. Concurrent first turns
    /// for the same id end up with a single row.
    pub async fn get_or_create_session(&self, session_id: &str) -> Result<ChatSession, AppError> {
        let now = now_timestamp();
        let inserted = sqlx::query(
            "INSERT INTO chat_sessions (id, created_at, updated_at) VALUES (?, ?, ?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(session_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            info!(%session_id, "Chat session created");
        }

        let row = sqlx::query("SELECT id, created_at, updated_at FROM chat_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(ChatSession {
            id: row.get("id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    /// Append a message and bump the session's `updated_at`. The bump is
    /// best-effort: a failure there is logged, not returned.
    pub async fn save_message(
        &self,
        session_id: &str,
        role: ChatRole,
        content: &str,
        reasoning_details: Option<&Value>,
    ) -> Result<String, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();
        let reasoning = reasoning_details.map(serde_json::to_string).transpose()?;

        sqlx::query(
            "INSERT INTO chat_messages (id, session_id, role, content, reasoning_details, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(session_id)
        .bind(role.as_str())
        .bind(content)
        .bind(&reasoning)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        if let Err(e) = sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(session_id)
            .execute(&self.pool)
            .await
        {
            warn!(%session_id, "Failed to bump session timestamp: {}", e);
        }

        Ok(id)
    }

    /// The latest `limit` messages of a session, oldest first.
    pub async fn last_messages(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, session_id, role, content, reasoning_details, created_at
               FROM chat_messages
               WHERE session_id = ?
               ORDER BY created_at DESC, rowid DESC
               LIMIT ?"#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = rows
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    /// Persona, then the context window in order, then the new user message.
    pub fn build_request(&self, context: &[ChatMessage], user_message: &str) -> CompletionRequest {
        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(UpstreamMessage {
            role: ChatRole::System,
            content: self.persona.to_string(),
            reasoning_details: None,
        });

        for message in context {
            let reasoning_details = message
                .reasoning_details
                .as_deref()
                .filter(|raw| !raw.is_empty())
                .and_then(|raw| serde_json::from_str(raw).ok());
            messages.push(UpstreamMessage {
                role: message.role,
                content: message.content.clone(),
                reasoning_details,
            });
        }

        messages.push(UpstreamMessage {
            role: ChatRole::User,
            content: user_message.to_string(),
            reasoning_details: None,
        });

        // Any model whose identifier mentions "think" gets reasoning turned on.
        let extra_body = self
            .model
            .contains("think")
            .then(|| json!({ "reasoning": { "enabled": true } }));

        CompletionRequest {
            model: self.model.clone(),
            messages,
            extra_body,
        }
    }

    /// Run one chat turn end to end.
    pub async fn handle_turn(
        &self,
        request: &ChatRequest,
        referer: Option<&str>,
    ) -> Result<ChatOutcome, AppError> {
        request.validated()?;

        let session = self.get_or_create_session(&request.session_id).await?;
        let context = self.last_messages(&session.id, CONTEXT_WINDOW).await?;

        self.save_message(&session.id, ChatRole::User, &request.message, None)
            .await?;

        let upstream_request = self.build_request(&context, &request.message);
        let reply = self.upstream.complete(&upstream_request, referer).await?;

        if reply.status != StatusCode::OK {
            return Ok(ChatOutcome::Passthrough {
                status: reply.status,
                content_type: reply.content_type,
                body: reply.body,
            });
        }

        let completion = Completion::from_body(&reply.body)?;
        let message_id = self
            .save_message(
                &session.id,
                ChatRole::Assistant,
                &completion.content,
                completion.reasoning_details.as_ref(),
            )
            .await?;

        info!(session_id = %session.id, %message_id, "Chat turn answered");

        Ok(ChatOutcome::Answered(ChatResponse {
            answer: completion.content,
            session_id: session.id,
            message_id,
        }))
    }
}

fn message_from_row(row: &SqliteRow) -> Result<ChatMessage, AppError> {
    let role: String = row.get("role");
    Ok(ChatMessage {
        id: row.get("id"),
        session_id: row.get("session_id"),
        role: role.parse().map_err(AppError::Internal)?,
        content: row.get("content"),
        reasoning_details: row.get("reasoning_details"),
        created_at: row.get("created_at"),
    })
}
