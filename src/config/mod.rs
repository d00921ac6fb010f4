//! Configuration module for the resume backend.
//!
//! All configuration is loaded once from environment variables with sensible defaults.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

/// Persona used as the fixed system message when no persona file is configured.
const DEFAULT_PERSONA: &str = include_str!("persona.txt");

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer secret guarding write operations
    pub root_key: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Upstream chat-completion settings
    pub openrouter: OpenRouterConfig,
    /// System persona sent ahead of every chat context window
    pub persona: String,
}

/// Settings for the upstream chat-completion API.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();

        let root_key = non_empty_var("ROOT_KEY");

        let db_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "./data/resume.sqlite".to_string())
            .into();

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let openrouter = OpenRouterConfig {
            api_key: non_empty_var("OPENROUTER_API_KEY"),
            model: env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
            base_url: env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
        };

        let persona = match non_empty_var("CHAT_PERSONA_PATH") {
            Some(path) => std::fs::read_to_string(&path).unwrap_or_else(|e| {
                tracing::warn!("Failed to read persona file {}: {}", path, e);
                DEFAULT_PERSONA.to_string()
            }),
            None => DEFAULT_PERSONA.to_string(),
        };

        Ok(Self {
            root_key,
            db_path,
            bind_addr,
            log_level,
            openrouter,
            persona,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
