//! Resume Backend
//!
//! REST backend for a personal site: bootcamps, journal, memes, stories and
//! contact submissions on SQLite, plus a context-aware chat endpoint backed by
//! an OpenRouter-compatible completion API.

mod api;
mod auth;
mod chat;
mod config;
mod db;
mod errors;
mod models;
mod services;
mod validation;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chat::ChatManager;
use config::Config;
use services::Services;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub chat: Arc<ChatManager>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            services: Arc::new(Services::new(pool.clone())),
            chat: Arc::new(ChatManager::new(pool, &config)),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Resume Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Chat model: {}", config.openrouter.model);

    if config.root_key.is_none() {
        tracing::warn!("No ROOT_KEY configured. Write routes will reject every request.");
    }
    if config.openrouter.api_key.is_none() {
        tracing::warn!("No OPENROUTER_API_KEY configured. Chat requests will fail.");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;

    let bind_addr = config.bind_addr;
    let app = create_router(AppState::new(pool, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Reads, the contact form and chat
    let public_routes = Router::new()
        .route("/bootcamps", get(api::list_bootcamps))
        .route("/bootcamps/{id}", get(api::get_bootcamp))
        .route("/journal", get(api::list_journal))
        .route("/journal/{id}", get(api::get_journal_entry))
        .route("/memes/categories", get(api::list_categories))
        .route("/memes/categories/{id}", get(api::get_category))
        .route("/memes/{id}", get(api::get_meme))
        .route("/stories", get(api::list_stories))
        .route("/stories/{id}", get(api::get_story))
        .route("/contacts", post(api::create_contact))
        .route("/chat", post(api::chat))
        .route("/resource", get(api::list_resource))
        .route("/resource/id", get(api::get_resource));

    // Writes and contact reads require the bearer token
    let protected_routes = Router::new()
        .route("/bootcamps", post(api::create_bootcamp))
        .route(
            "/bootcamps/{id}",
            put(api::update_bootcamp).delete(api::delete_bootcamp),
        )
        .route("/journal", post(api::create_journal_entry))
        .route(
            "/journal/{id}",
            put(api::update_journal_entry).delete(api::delete_journal_entry),
        )
        .route("/memes/categories", post(api::create_category))
        .route(
            "/memes/categories/{id}",
            delete(api::delete_category),
        )
        .route("/memes", post(api::create_meme))
        .route(
            "/memes/{id}",
            put(api::update_meme).delete(api::delete_meme),
        )
        .route("/stories", post(api::create_story))
        .route(
            "/stories/{id}",
            put(api::update_story).delete(api::delete_story),
        )
        .route("/contacts", get(api::list_contacts))
        .route(
            "/contacts/{id}",
            get(api::get_contact).delete(api::delete_contact),
        )
        .route("/resource", post(api::create_resource))
        .route(
            "/resource/id",
            put(api::update_resource).delete(api::delete_resource),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_root_key,
        ));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
