mod auth;
mod config;
mod db;
mod dictionary;
mod game;
mod models;
mod routes;

use std::sync::Arc;

use anyhow::Result;
use auth::{Authenticator, PasswordAuthenticator};
use axum::Router;
use config::Config;
use db::{PgRepository, Repository};
use dictionary::WordList;
use game::SessionCoordinator;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub repository: Arc<dyn Repository>,
    pub authenticator: Arc<dyn Authenticator>,
    pub coordinator: SessionCoordinator,
}

impl AppState {
    pub fn new(config: Config, repository: Arc<dyn Repository>) -> Self {
        let rules = config.game.rules.clone();
        Self {
            authenticator: Arc::new(PasswordAuthenticator::new(repository.clone(), rules.clone())),
            coordinator: SessionCoordinator::new(repository.clone(), rules),
            repository,
            config,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the word list file into the pool. A missing or empty file is not
/// fatal; rounds fail with an empty-pool error until words exist.
async fn seed_word_pool(repository: &dyn Repository, config: &Config) -> Result<()> {
    let word_list = match WordList::load(&config.game.word_list_path, config.game.rules.word_length).await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(
                "Failed to load word list: {}. Using words already in the database.",
                e
            );
            tracing::warn!(
                "Put one {}-letter word per line in {} to seed the pool",
                config.game.rules.word_length,
                config.game.word_list_path
            );
            WordList::empty()
        }
    };

    if !word_list.is_empty() {
        let inserted = repository.insert_words(word_list.words()).await?;
        tracing::info!("Added {} new words to the pool", inserted);
    }

    let pool_size = repository.count_words().await?;
    if pool_size == 0 {
        tracing::warn!("Word pool is empty; starting a game will fail");
    } else {
        tracing::info!("Word pool has {} words", pool_size);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexiquest_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LexiQuest backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config.game.rules);

    // Connect to database
    let db = db::create_pool(config.database_url(), config.database.max_connections).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations completed");

    let repository: Arc<dyn Repository> =
        Arc::new(PgRepository::new(db, config.game.rules.word_length));

    seed_word_pool(repository.as_ref(), &config).await?;

    // Create application state
    let addr = config.server_addr();
    let state = Arc::new(AppState::new(config, repository));
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
