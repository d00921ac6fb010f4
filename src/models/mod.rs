//! Request and response types for every resource.
//!
//! Field names are the wire contract and are serialized verbatim (snake_case).

mod bootcamp;
mod chat;
mod contact;
mod journal;
mod meme;
mod story;

pub use bootcamp::*;
pub use chat::*;
pub use contact::*;
pub use journal::*;
pub use meme::*;
pub use story::*;

use serde::{Deserialize, Serialize};

/// Body returned by successful deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
