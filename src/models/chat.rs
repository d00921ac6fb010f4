use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::{FieldViolation, Rule, Validate, Validator};

const MESSAGE: &[Rule] = &[Rule::Required, Rule::Min(1)];
const SESSION_ID: &[Rule] = &[Rule::Required, Rule::Min(1)];

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::System => "system",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            "system" => Ok(ChatRole::System),
            other => Err(format!("unknown chat role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A persisted chat message. `reasoning_details` is the raw JSON text the
/// upstream returned alongside an answer, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub role: ChatRole,
    pub content: String,
    pub reasoning_details: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

impl Validate for ChatRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new()
            .field("message", &self.message, MESSAGE)
            .field("session_id", &self.session_id, SESSION_ID)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub session_id: String,
    pub message_id: String,
}
